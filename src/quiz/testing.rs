//! 单元测试用的协作者替身：所有调用按顺序写入共享日志。

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use serde_json::Value;

use super::card::{CardElement, DEFAULT_QUESTION_ATTRIBUTE};
use super::widget::{FlipWidget, QuizEngine, WidgetHost};

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

#[derive(Debug)]
pub struct FakeFlip {
    id: String,
    flipped: Rc<Cell<bool>>,
    journal: Journal,
}

impl FakeFlip {
    pub fn new(id: &str, journal: &Journal) -> Self {
        Self {
            id: id.to_string(),
            flipped: Rc::new(Cell::new(false)),
            journal: journal.clone(),
        }
    }
}

impl FlipWidget for FakeFlip {
    fn flip(&mut self) {
        self.flipped.set(true);
        self.journal.push(format!("flip {}", self.id));
    }

    fn unflip(&mut self) {
        self.flipped.set(false);
        self.journal.push(format!("unflip {}", self.id));
    }

    fn is_flipped(&self) -> bool {
        self.flipped.get()
    }
}

#[derive(Debug)]
pub struct FakeQuiz {
    pub options: Value,
    pub disabled: bool,
    journal: Journal,
}

impl QuizEngine for FakeQuiz {
    fn navigate_to(&mut self, question: Option<&str>) {
        self.journal
            .push(format!("goto {}", question.unwrap_or("null")));
    }

    fn enable(&mut self) {
        self.disabled = false;
        self.journal.push("quiz enable");
    }

    fn disable(&mut self) {
        self.disabled = true;
        self.journal.push("quiz disable");
    }
}

#[derive(Debug)]
pub struct FakeHost {
    journal: Journal,
    unbindable: HashSet<String>,
}

impl FakeHost {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            unbindable: HashSet::new(),
        }
    }

    /// 指定的卡片创建不出翻转组件。
    pub fn without_flip(mut self, question: &str) -> Self {
        self.unbindable.insert(question.to_string());
        self
    }
}

fn question_of(element: &CardElement) -> String {
    element
        .attribute(DEFAULT_QUESTION_ATTRIBUTE)
        .unwrap_or("?")
        .to_string()
}

impl WidgetHost for FakeHost {
    type Flip = FakeFlip;
    type Quiz = FakeQuiz;

    fn create_quiz(&mut self, options: &Value) -> FakeQuiz {
        self.journal.push("create quiz");
        FakeQuiz {
            options: options.clone(),
            disabled: false,
            journal: self.journal.clone(),
        }
    }

    fn detach_flip(&mut self, element: &CardElement) {
        self.journal.push(format!("detach {}", question_of(element)));
    }

    fn create_flip(&mut self, element: &CardElement, options: &Value) -> Option<FakeFlip> {
        let question = question_of(element);
        if self.unbindable.contains(&question) {
            return None;
        }
        let trigger = options
            .get("trigger")
            .and_then(Value::as_str)
            .unwrap_or("none");
        self.journal
            .push(format!("create flip {question} {trigger}"));
        Some(FakeFlip::new(&question, &self.journal))
    }
}
