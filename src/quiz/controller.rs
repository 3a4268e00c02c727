use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::card::{CardElement, CardRecord};
use super::classes::ClassList;
use super::error::CardsQuizError;
use super::events::{CardTarget, CardsQuizEvent, CardsQuizInput, OptionChange};
use super::options::CardsQuizOptions;
use super::widget::{self, FlipWidget, QuizEngine, Switchable, WidgetBase, WidgetHost};
use crate::utils;

/// 控制器的激活状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState<'a> {
    /// 没有激活的卡片。
    Idle,
    /// 正在等待翻转完成或问题显示的确认。
    Transitioning,
    Active(&'a str),
}

/// 卡片激活控制器：同一时刻至多一张激活卡片，并在翻转组件与问答引擎之间协调。
pub struct CardsQuiz<F, Q> {
    options: CardsQuizOptions,
    base: WidgetBase,
    classes: ClassList,
    quiz_classes: ClassList,
    cards_classes: ClassList,
    cards: Vec<CardRecord<F>>,
    index: HashMap<String, usize>,
    active: Option<usize>,
    transition: Option<u64>,
    tickets: u64,
    quiz: Q,
}

impl<F: FlipWidget, Q: QuizEngine> CardsQuiz<F, Q> {
    /// 按发现顺序为每个卡片元素建立记录，并创建问答引擎。
    ///
    /// 任何一张卡片缺少问题 id 都会中止初始化。
    pub fn new<H>(
        options: CardsQuizOptions,
        elements: &[CardElement],
        host: &mut H,
    ) -> Result<Self, CardsQuizError>
    where
        H: WidgetHost<Flip = F, Quiz = Q>,
    {
        let questions = resolve_questions(&options, elements)?;
        let quiz = host.create_quiz(&options.quiz_engine_options());

        let mut cards = Vec::with_capacity(elements.len());
        let mut index = HashMap::with_capacity(elements.len());
        for (position, (element, question)) in elements.iter().zip(questions).enumerate() {
            let flip_options = options.flip_options_for(element);
            let mut card = CardRecord::bind(element, question.clone(), &flip_options, host);
            card.classes_mut().add(&options.classes.card);
            index.insert(question, position);
            cards.push(card);
        }

        let mut classes = ClassList::new();
        classes.add(&options.classes.root);
        let mut quiz_classes = ClassList::new();
        quiz_classes.add(&options.classes.quiz_container);
        let mut cards_classes = ClassList::new();
        cards_classes.add(&options.classes.cards_container);
        let start_disabled = options.disabled;

        let mut controller = Self {
            options,
            base: WidgetBase::default(),
            classes,
            quiz_classes,
            cards_classes,
            cards,
            index,
            active: None,
            transition: None,
            tickets: 0,
            quiz,
        };
        if start_disabled {
            controller.disable();
        }
        utils::debug(&format!(
            "[CardsQuiz] initialized with {} cards",
            controller.cards.len()
        ));
        Ok(controller)
    }

    /// 激活指定卡片；`None` 表示取消当前激活的卡片。
    ///
    /// 禁用或过渡中时忽略请求。
    pub fn activate(&mut self, target: Option<CardTarget>) {
        if self.base.is_disabled() || self.transition.is_some() {
            utils::debug("[CardsQuiz] activation ignored: disabled or in transition");
            return;
        }
        match target {
            Some(target) => self.activate_card(&target),
            None => self.deactivate(),
        }
    }

    fn activate_card(&mut self, target: &CardTarget) {
        let Some(position) = self.resolve(target) else {
            utils::debug(&format!("[CardsQuiz] unknown card {target:?}"));
            return;
        };
        if self.active == Some(position) {
            return;
        }

        self.begin_transition();
        if let Some(outgoing) = self.active.take() {
            self.release(outgoing);
        }

        self.active = Some(position);
        let card = &mut self.cards[position];
        card.classes_mut().add(&self.options.classes.card_active);
        if card.is_flipped() {
            self.quiz.navigate_to(Some(card.id()));
        } else {
            // 翻转完成事件到达后才跳转问题
            card.flip();
        }
    }

    /// 让出激活状态。未作答的卡片需要同时清空问答并翻回。
    fn release(&mut self, outgoing: usize) {
        let card = &mut self.cards[outgoing];
        card.classes_mut().remove(&self.options.classes.card_active);
        if !card.has_answers() {
            self.quiz.navigate_to(None);
            card.unflip();
        }
    }

    fn deactivate(&mut self) {
        let Some(outgoing) = self.active.take() else {
            return;
        };
        self.begin_transition();
        self.quiz.navigate_to(None);
        let card = &mut self.cards[outgoing];
        card.classes_mut().remove(&self.options.classes.card_active);
        card.unflip();
    }

    fn begin_transition(&mut self) {
        self.tickets += 1;
        self.transition = Some(self.tickets);
    }

    /// 翻转组件报告某张卡片的动画结束。
    pub fn on_card_flipped(&mut self, card_id: &str) -> Vec<CardsQuizEvent> {
        let Some(&position) = self.index.get(card_id) else {
            utils::warn(&format!("[CardsQuiz] flip finished on unknown card {card_id}"));
            return Vec::new();
        };
        if self.active == Some(position) {
            self.quiz.navigate_to(Some(card_id));
        }
        vec![CardsQuizEvent::CardFlipped {
            card: self.cards[position].snapshot(),
        }]
    }

    pub fn on_card_click(&mut self, card_id: &str) {
        if self.base.is_disabled() || self.transition.is_some() {
            return;
        }
        self.activate(Some(CardTarget::from(card_id)));
    }

    /// 问答引擎已切换到新问题，过渡结束。
    pub fn on_question_shown(&mut self) {
        if let Some(ticket) = self.transition.take() {
            utils::debug(&format!("[CardsQuiz] transition {ticket} settled"));
        }
    }

    /// 用问答引擎的运行时快照更新当前卡片，并切换正确/错误样式。
    pub fn on_option_changed(&mut self, change: OptionChange) -> Vec<CardsQuizEvent> {
        let Some(position) = self.active else {
            utils::warn(&format!(
                "[CardsQuiz] option change for {} without an active card",
                change.question_id
            ));
            return Vec::new();
        };
        let classes = &self.options.classes;
        let card = &mut self.cards[position];
        card.record_answers(&change.runtime);
        if card.is_correct() == Some(true) {
            card.classes_mut()
                .swap(&classes.card_correct, &classes.card_incorrect);
        } else {
            card.classes_mut()
                .swap(&classes.card_incorrect, &classes.card_correct);
        }
        vec![CardsQuizEvent::QuestionChanged {
            card: card.snapshot(),
            question_change: change.question_change(),
        }]
    }

    /// 问答结束：禁用问答引擎与控制器，原样转发评分结果。
    pub fn on_quiz_ended(&mut self, evaluation: Value) -> Vec<CardsQuizEvent> {
        self.disable();
        vec![CardsQuizEvent::QuizEnded { evaluation }]
    }

    pub fn handle(&mut self, input: CardsQuizInput) -> Vec<CardsQuizEvent> {
        match input {
            CardsQuizInput::Activate { target } => {
                self.activate(target);
                Vec::new()
            }
            CardsQuizInput::CardClick { card } => {
                self.on_card_click(&card);
                Vec::new()
            }
            CardsQuizInput::CardFlipped { card } => self.on_card_flipped(&card),
            CardsQuizInput::QuestionShown => {
                self.on_question_shown();
                Vec::new()
            }
            CardsQuizInput::OptionChanged { change } => self.on_option_changed(change),
            CardsQuizInput::QuizEnded { evaluation } => self.on_quiz_ended(evaluation),
            CardsQuizInput::Enable => {
                self.enable();
                Vec::new()
            }
            CardsQuizInput::Disable => {
                self.disable();
                Vec::new()
            }
        }
    }

    pub fn enable(&mut self) {
        widget::enable(self);
    }

    pub fn disable(&mut self) {
        widget::disable(self);
    }

    /// 当前未确认的过渡编号。
    pub fn pending_transition(&self) -> Option<u64> {
        self.transition
    }

    /// 超时释放过渡锁；只有编号仍然匹配时才生效。
    pub fn expire_transition(&mut self, ticket: u64) -> bool {
        if self.transition != Some(ticket) {
            return false;
        }
        self.transition = None;
        utils::warn(&format!("[CardsQuiz] transition {ticket} timed out"));
        true
    }

    pub fn state(&self) -> ActivationState<'_> {
        if self.transition.is_some() {
            return ActivationState::Transitioning;
        }
        match self.active_card() {
            Some(card) => ActivationState::Active(card.id()),
            None => ActivationState::Idle,
        }
    }

    pub fn active_card(&self) -> Option<&CardRecord<F>> {
        self.active.map(|position| &self.cards[position])
    }

    pub fn card(&self, card_id: &str) -> Option<&CardRecord<F>> {
        self.index.get(card_id).map(|&position| &self.cards[position])
    }

    pub fn cards(&self) -> impl Iterator<Item = &CardRecord<F>> {
        self.cards.iter()
    }

    pub fn is_disabled(&self) -> bool {
        self.base.is_disabled()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn root_classes(&self) -> &ClassList {
        &self.classes
    }

    /// 问答容器元素的类。
    pub fn quiz_classes(&self) -> &ClassList {
        &self.quiz_classes
    }

    /// 卡片容器元素的类。
    pub fn cards_classes(&self) -> &ClassList {
        &self.cards_classes
    }

    pub fn options(&self) -> &CardsQuizOptions {
        &self.options
    }

    pub fn quiz(&self) -> &Q {
        &self.quiz
    }

    fn resolve(&self, target: &CardTarget) -> Option<usize> {
        match target {
            CardTarget::Id(id) => self.index.get(id).copied(),
            // 数字目标按问题属性的字面值查找
            CardTarget::Index(question) => self.index.get(&question.to_string()).copied(),
        }
    }
}

impl<F: FlipWidget, Q: QuizEngine> Switchable for CardsQuiz<F, Q> {
    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn on_enable(&mut self) {
        self.classes.remove(&self.options.classes.disabled_state);
        self.quiz.enable();
    }

    fn on_disable(&mut self) {
        self.classes.add(&self.options.classes.disabled_state);
        self.quiz.disable();
    }
}

fn resolve_questions(
    options: &CardsQuizOptions,
    elements: &[CardElement],
) -> Result<Vec<String>, CardsQuizError> {
    let mut seen = HashSet::new();
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let question = element
                .attribute(&options.question_attribute)
                .filter(|question| !question.trim().is_empty())
                .ok_or_else(|| CardsQuizError::MissingQuestion {
                    index,
                    attribute: options.question_attribute.clone(),
                })?;
            if !seen.insert(question) {
                return Err(CardsQuizError::DuplicateQuestion {
                    question: question.to_string(),
                });
            }
            Ok(question.to_string())
        })
        .collect()
}
