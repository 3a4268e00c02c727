use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 初始化阶段的配置错误。出现任何一个都会中止整个组件的创建。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum CardsQuizError {
    #[error("[CardsQuiz] the card at position {index} must have a question ({attribute})")]
    MissingQuestion { index: usize, attribute: String },
    #[error("[CardsQuiz] question {question} is bound to more than one card")]
    DuplicateQuestion { question: String },
    #[error("[CardsQuiz] invalid options: {message}")]
    InvalidOptions { message: String },
}
