use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::card::{CardSnapshot, QuestionRuntime};

/// 卡片翻转动画结束。
pub const ON_CARD_FLIP: &str = "cardsQuiz:cardFlip";
/// 当前问题的某个选项被选中或取消。
pub const ON_QUESTION_CHANGE: &str = "cardsQuiz:questionChange";
/// 问答结束。
pub const ON_END: &str = "cardsQuiz:end";

/// 通过问题 id 指定卡片；数字目标与字面值相同的问题 id 对应。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CardTarget {
    Index(usize),
    Id(String),
}

impl From<&str> for CardTarget {
    fn from(id: &str) -> Self {
        CardTarget::Id(id.to_string())
    }
}

impl From<String> for CardTarget {
    fn from(id: String) -> Self {
        CardTarget::Id(id)
    }
}

impl From<usize> for CardTarget {
    fn from(index: usize) -> Self {
        CardTarget::Index(index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionChange {
    pub question_id: String,
    pub option_id: String,
    #[serde(default)]
    pub option_value: Option<String>,
}

/// 问答引擎上报的选项变化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionChange {
    pub question_id: String,
    pub option_id: String,
    #[serde(default)]
    pub option_value: Option<String>,
    #[serde(default)]
    pub runtime: QuestionRuntime,
}

impl OptionChange {
    pub fn question_change(&self) -> QuestionChange {
        QuestionChange {
            question_id: self.question_id.clone(),
            option_id: self.option_id.clone(),
            option_value: self.option_value.clone(),
        }
    }
}

/// 控制器对外发出的通知。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CardsQuizEvent {
    CardFlipped {
        card: CardSnapshot,
    },
    QuestionChanged {
        card: CardSnapshot,
        #[serde(rename = "questionChange")]
        question_change: QuestionChange,
    },
    QuizEnded {
        #[serde(alias = "calification")]
        evaluation: Value,
    },
}

impl CardsQuizEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CardsQuizEvent::CardFlipped { .. } => ON_CARD_FLIP,
            CardsQuizEvent::QuestionChanged { .. } => ON_QUESTION_CHANGE,
            CardsQuizEvent::QuizEnded { .. } => ON_END,
        }
    }
}

/// 嵌入层转发给控制器的外部输入。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CardsQuizInput {
    /// `target` 为空表示取消当前卡片。
    Activate {
        #[serde(default)]
        target: Option<CardTarget>,
    },
    CardClick {
        card: String,
    },
    CardFlipped {
        card: String,
    },
    QuestionShown,
    OptionChanged {
        change: OptionChange,
    },
    QuizEnded {
        #[serde(default)]
        evaluation: Value,
    },
    Enable,
    Disable,
}
