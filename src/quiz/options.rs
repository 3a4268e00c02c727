use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::card::{CardElement, DEFAULT_QUESTION_ATTRIBUTE};
use super::error::CardsQuizError;
use crate::utils::{as_object, data_options, merge_json};

/// 卡片元素上覆盖翻转组件选项的 `data-*` 前缀。
pub const FLIP_DATA_PREFIX: &str = "flip";

/// 组件使用的 CSS 类名。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassNames {
    pub root: String,
    #[serde(alias = "disabled")]
    pub disabled_state: String,
    #[serde(alias = "quiz")]
    pub quiz_container: String,
    #[serde(alias = "cardsWrapper")]
    pub cards_container: String,
    pub card: String,
    #[serde(alias = "cardIsCorrect")]
    pub card_correct: String,
    #[serde(alias = "cardIsIncorrect")]
    pub card_incorrect: String,
    pub card_active: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            root: "c-cards-quiz".to_string(),
            disabled_state: "c-cards-quiz--disabled".to_string(),
            quiz_container: "c-cards-quiz__quiz".to_string(),
            cards_container: "c-cards-quiz__cards".to_string(),
            card: "c-cards-quiz__card".to_string(),
            card_correct: "c-cards-quiz__card--correct".to_string(),
            card_incorrect: "c-cards-quiz__card--incorrect".to_string(),
            card_active: "c-cards-quiz__card--active".to_string(),
        }
    }
}

/// 在根元素内查找子元素所用的选择器，由嵌入层使用。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub cards_wrapper: String,
    pub card: String,
    pub quiz: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            cards_wrapper: "[data-cq-cards]".to_string(),
            card: "[data-cq-card]".to_string(),
            quiz: "[data-cq-quiz]".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CardsQuizOptions {
    /// 事件命名空间。
    #[serde(alias = "eventNamespace")]
    pub namespace: String,
    pub disabled: bool,
    /// 卡片上保存问题 id 的属性名。
    #[serde(alias = "questionAttributeName")]
    pub question_attribute: String,
    pub classes: ClassNames,
    pub selectors: Selectors,
    /// 传给每张卡片翻转组件的选项。
    #[serde(alias = "flipWidgetOptions")]
    pub flip: Value,
    /// 传给问答引擎的选项。
    #[serde(rename = "jqQuiz", alias = "quizEngineOptions")]
    pub quiz: Value,
    /// 过渡锁的超时（毫秒）。为空时一直等待确认事件。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_timeout: Option<u32>,
}

impl Default for CardsQuizOptions {
    fn default() -> Self {
        Self {
            namespace: "jq-cards-quiz".to_string(),
            disabled: false,
            question_attribute: DEFAULT_QUESTION_ATTRIBUTE.to_string(),
            classes: ClassNames::default(),
            selectors: Selectors::default(),
            flip: Value::Object(Map::new()),
            quiz: Value::Object(Map::new()),
            transition_timeout: None,
        }
    }
}

impl CardsQuizOptions {
    pub fn from_json(json: &str) -> Result<Self, CardsQuizError> {
        serde_json::from_str(json).map_err(|error| CardsQuizError::InvalidOptions {
            message: error.to_string(),
        })
    }

    /// 问答引擎选项：调用方的配置加上强制项（自动开始、无初始问题、不自动前进）。
    pub fn quiz_engine_options(&self) -> Value {
        let mut options = Value::Object(as_object(&self.quiz));
        merge_json(
            &mut options,
            &json!({ "autoStart": true, "initialQuestion": null, "autoGoNext": false }),
        );
        options
    }

    /// 某张卡片的翻转组件选项：全局配置叠加元素自身的 `data-flip-*` 覆盖，触发方式强制为手动。
    pub fn flip_options_for(&self, element: &CardElement) -> Value {
        let mut options = as_object(&self.flip);
        options.extend(data_options(&element.attributes, FLIP_DATA_PREFIX));
        options.insert("trigger".to_string(), Value::String("manual".to_string()));
        Value::Object(options)
    }
}
