use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::classes::ClassList;
use super::widget::{FlipWidget, WidgetHost};

/// 问题 id 的默认属性名。
pub const DEFAULT_QUESTION_ATTRIBUTE: &str = "data-cq-question";

/// 嵌入层在 DOM 中发现的一张卡片元素：只保留其属性。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardElement {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl CardElement {
    /// 使用默认问题属性创建卡片元素。
    pub fn new(question: impl Into<String>) -> Self {
        Self::default().with_attribute(DEFAULT_QUESTION_ATTRIBUTE, question)
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// 问答引擎中某个问题的运行时快照。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionRuntime {
    /// 已选选项 id。
    pub options: Vec<String>,
    /// 与 `options` 一一对应的选项值，可能为空。
    pub options_values: Vec<Option<String>>,
    pub is_correct: Option<bool>,
}

/// 卡片的只读视图，随事件一起发出。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub id: String,
    pub answer_ids: Vec<String>,
    pub answer_values: Vec<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    pub flipped: bool,
    pub classes: ClassList,
}

/// 一张卡片：翻转组件句柄与所绑定问题的最新作答快照。
#[derive(Debug)]
pub struct CardRecord<F> {
    id: String,
    flip: Option<F>,
    answer_ids: Vec<String>,
    answer_values: Vec<Option<String>>,
    is_correct: Option<bool>,
    classes: ClassList,
}

impl<F: FlipWidget> CardRecord<F> {
    pub fn new(id: impl Into<String>, flip: Option<F>) -> Self {
        Self {
            id: id.into(),
            flip,
            answer_ids: Vec::new(),
            answer_values: Vec::new(),
            is_correct: None,
            classes: ClassList::new(),
        }
    }

    /// 绑定到卡片元素：先解除旧的翻转绑定，再以手动触发方式创建翻转组件。
    pub fn bind<H>(
        element: &CardElement,
        question: impl Into<String>,
        flip_options: &serde_json::Value,
        host: &mut H,
    ) -> Self
    where
        H: WidgetHost<Flip = F>,
    {
        host.detach_flip(element);
        let flip = host.create_flip(element, flip_options);
        Self::new(question, flip)
    }

    /// 恢复已有的作答快照。
    pub fn with_answers(
        mut self,
        answer_ids: Vec<String>,
        answer_values: Vec<Option<String>>,
        is_correct: Option<bool>,
    ) -> Self {
        self.set_answers(answer_ids, answer_values, is_correct);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn flip(&mut self) {
        if let Some(widget) = self.flip.as_mut() {
            widget.flip();
        }
    }

    pub fn unflip(&mut self) {
        if let Some(widget) = self.flip.as_mut() {
            widget.unflip();
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flip.as_ref().map(|widget| widget.is_flipped()).unwrap_or(false)
    }

    pub fn has_flip(&self) -> bool {
        self.flip.is_some()
    }

    pub fn answer_ids(&self) -> &[String] {
        &self.answer_ids
    }

    pub fn answer_values(&self) -> &[Option<String>] {
        &self.answer_values
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.is_correct
    }

    pub fn has_answers(&self) -> bool {
        !self.answer_ids.is_empty()
    }

    /// 用问答引擎的运行时快照覆盖本卡片的作答记录。
    pub fn record_answers(&mut self, runtime: &QuestionRuntime) {
        self.set_answers(
            runtime.options.clone(),
            runtime.options_values.clone(),
            runtime.is_correct,
        );
    }

    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    pub(crate) fn classes_mut(&mut self) -> &mut ClassList {
        &mut self.classes
    }

    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot {
            id: self.id.clone(),
            answer_ids: self.answer_ids.clone(),
            answer_values: self.answer_values.clone(),
            is_correct: self.is_correct,
            flipped: self.is_flipped(),
            classes: self.classes.clone(),
        }
    }

    fn set_answers(
        &mut self,
        answer_ids: Vec<String>,
        mut answer_values: Vec<Option<String>>,
        is_correct: Option<bool>,
    ) {
        // values 与 ids 等长
        answer_values.resize(answer_ids.len(), None);
        self.answer_ids = answer_ids;
        self.answer_values = answer_values;
        self.is_correct = is_correct;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::testing::{FakeFlip, FakeHost, Journal};
    use serde_json::json;

    #[test]
    fn flip_without_widget_is_a_silent_no_op() {
        let mut card: CardRecord<FakeFlip> = CardRecord::new("q1", None);
        card.flip();
        card.unflip();
        assert!(!card.is_flipped());
        assert!(!card.has_flip());
    }

    #[test]
    fn flip_and_unflip_drive_the_widget() {
        let journal = Journal::default();
        let mut card = CardRecord::new("q1", Some(FakeFlip::new("q1", &journal)));

        card.flip();
        assert!(card.is_flipped());
        card.unflip();
        assert!(!card.is_flipped());
        assert_eq!(journal.entries(), vec!["flip q1", "unflip q1"]);
    }

    #[test]
    fn bind_detaches_before_creating_widget() {
        let journal = Journal::default();
        let mut host = FakeHost::new(&journal);
        let element = CardElement::new("q7");

        let card = CardRecord::bind(&element, "q7", &json!({"trigger": "manual"}), &mut host);

        assert_eq!(card.id(), "q7");
        assert!(card.has_flip());
        assert_eq!(journal.entries(), vec!["detach q7", "create flip q7 manual"]);
    }

    #[test]
    fn record_answers_keeps_values_parallel_to_ids() {
        let mut card: CardRecord<FakeFlip> = CardRecord::new("q1", None);
        assert!(!card.has_answers());

        card.record_answers(&QuestionRuntime {
            options: vec!["a1".to_string(), "a2".to_string()],
            options_values: vec![Some("x".to_string())],
            is_correct: Some(false),
        });

        assert!(card.has_answers());
        assert_eq!(card.answer_values(), &[Some("x".to_string()), None]);
        assert_eq!(card.is_correct(), Some(false));

        card.record_answers(&QuestionRuntime::default());
        assert!(!card.has_answers());
        assert!(card.answer_values().is_empty());
        assert_eq!(card.is_correct(), None);
    }

    #[test]
    fn with_answers_restores_snapshot() {
        let card: CardRecord<FakeFlip> = CardRecord::new("q2", None).with_answers(
            vec!["a1".to_string()],
            vec![None, Some("extra".to_string())],
            Some(true),
        );

        let snapshot = card.snapshot();
        assert_eq!(snapshot.answer_ids, vec!["a1".to_string()]);
        assert_eq!(snapshot.answer_values, vec![None]);
        assert_eq!(snapshot.is_correct, Some(true));
        assert!(!snapshot.flipped);
    }

    #[test]
    fn runtime_deserializes_from_quiz_payload() {
        let runtime: QuestionRuntime = serde_json::from_value(json!({
            "options": ["a1"],
            "optionsValues": [null],
            "isCorrect": true,
            "attempts": 2
        }))
        .expect("runtime should parse");

        assert_eq!(runtime.options, vec!["a1".to_string()]);
        assert_eq!(runtime.options_values, vec![None]);
        assert_eq!(runtime.is_correct, Some(true));
    }
}
