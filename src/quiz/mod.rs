//! 翻卡问答核心逻辑（卡片记录、激活状态机、事件与配置）。

pub mod card;
pub mod classes;
pub mod controller;
pub mod error;
pub mod events;
pub mod options;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;

pub use card::{CardElement, CardRecord, CardSnapshot, QuestionRuntime, DEFAULT_QUESTION_ATTRIBUTE};
pub use classes::ClassList;
pub use controller::{ActivationState, CardsQuiz};
pub use error::CardsQuizError;
pub use events::{
    CardTarget,
    CardsQuizEvent,
    CardsQuizInput,
    OptionChange,
    QuestionChange,
    ON_CARD_FLIP,
    ON_END,
    ON_QUESTION_CHANGE,
};
pub use options::{CardsQuizOptions, ClassNames, Selectors, FLIP_DATA_PREFIX};
pub use widget::{FlipWidget, QuizEngine, Switchable, WidgetBase, WidgetHost};
