pub mod quiz;
pub mod utils;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Function;

pub use quiz::{
    ActivationState, CardElement, CardRecord, CardSnapshot, CardTarget, CardsQuiz, CardsQuizError,
    CardsQuizEvent, CardsQuizInput, CardsQuizOptions, ClassList, ClassNames, FlipWidget,
    OptionChange, QuestionChange, QuestionRuntime, QuizEngine, Selectors, Switchable, WidgetBase,
    WidgetHost,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

#[wasm_bindgen]
extern "C" {
    /// 翻转组件实例（flip 插件的 flipModel）。
    pub type JsFlipModel;

    #[wasm_bindgen(method)]
    fn flip(this: &JsFlipModel);

    #[wasm_bindgen(method)]
    fn unflip(this: &JsFlipModel);

    #[wasm_bindgen(method, getter, js_name = isFlipped)]
    fn is_flipped(this: &JsFlipModel) -> bool;

    /// 问答引擎实例。
    pub type JsQuiz;

    #[wasm_bindgen(method, js_name = goTo)]
    fn go_to(this: &JsQuiz, question: JsValue);

    #[wasm_bindgen(method)]
    fn enable(this: &JsQuiz);

    #[wasm_bindgen(method)]
    fn disable(this: &JsQuiz);

    /// 嵌入页面提供的工厂，负责创建问答引擎与翻转组件。
    pub type JsHost;

    #[wasm_bindgen(method, js_name = createQuiz)]
    fn create_quiz(this: &JsHost, options: JsValue) -> JsQuiz;

    #[wasm_bindgen(method, js_name = detachFlip)]
    fn detach_flip(this: &JsHost, card: JsValue);

    #[wasm_bindgen(method, js_name = createFlip)]
    fn create_flip(this: &JsHost, card: JsValue, options: JsValue) -> JsValue;
}

pub struct JsFlip(JsFlipModel);

impl FlipWidget for JsFlip {
    fn flip(&mut self) {
        self.0.flip();
    }

    fn unflip(&mut self) {
        self.0.unflip();
    }

    fn is_flipped(&self) -> bool {
        self.0.is_flipped()
    }
}

pub struct JsQuizEngine(JsQuiz);

impl QuizEngine for JsQuizEngine {
    fn navigate_to(&mut self, question: Option<&str>) {
        let question = question.map(JsValue::from_str).unwrap_or(JsValue::NULL);
        self.0.go_to(question);
    }

    fn enable(&mut self) {
        self.0.enable();
    }

    fn disable(&mut self) {
        self.0.disable();
    }
}

struct JsWidgetHost(JsHost);

impl WidgetHost for JsWidgetHost {
    type Flip = JsFlip;
    type Quiz = JsQuizEngine;

    fn create_quiz(&mut self, options: &Value) -> JsQuizEngine {
        JsQuizEngine(self.0.create_quiz(to_js_or_null(options)))
    }

    fn detach_flip(&mut self, element: &CardElement) {
        self.0.detach_flip(to_js_or_null(element));
    }

    fn create_flip(&mut self, element: &CardElement, options: &Value) -> Option<JsFlip> {
        let model = self
            .0
            .create_flip(to_js_or_null(element), to_js_or_null(options));
        if model.is_null() || model.is_undefined() {
            utils::warn("[CardsQuiz] flip widget could not be created for a card");
            return None;
        }
        Some(JsFlip(model.unchecked_into()))
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn to_js_or_null<T: Serialize + ?Sized>(value: &T) -> JsValue {
    to_js(value).unwrap_or(JsValue::NULL)
}

fn to_js_error(error: CardsQuizError) -> JsValue {
    to_js(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn target_from_js(target: &JsValue) -> Option<CardTarget> {
    if let Some(id) = target.as_string() {
        return Some(CardTarget::Id(id));
    }
    target
        .as_f64()
        .filter(|index| *index >= 0.0 && index.fract() == 0.0)
        .map(|index| CardTarget::Index(index as usize))
}

type Controller = CardsQuiz<JsFlip, JsQuizEngine>;

struct Shared {
    controller: RefCell<Controller>,
    queue: RefCell<VecDeque<CardsQuizInput>>,
    draining: Cell<bool>,
    armed: Cell<u64>,
    listener: Option<Function>,
}

impl Shared {
    /// 输入先入队再依次处理；协作者在处理中同步回调时，新输入由外层循环接着处理。
    fn submit(shared: &Rc<Self>, input: CardsQuizInput) -> Result<Vec<CardsQuizEvent>, JsValue> {
        shared.queue.borrow_mut().push_back(input);
        if shared.draining.replace(true) {
            return Ok(Vec::new());
        }

        let mut emitted = Vec::new();
        let mut failure = None;
        loop {
            let next = shared.queue.borrow_mut().pop_front();
            let Some(input) = next else {
                break;
            };
            let events = shared.controller.borrow_mut().handle(input);
            Self::arm_timeout(shared);
            for event in &events {
                if let Err(error) = shared.emit(event) {
                    failure.get_or_insert(error);
                }
            }
            emitted.extend(events);
        }
        shared.draining.set(false);

        match failure {
            Some(error) => Err(error),
            None => Ok(emitted),
        }
    }

    fn emit(&self, event: &CardsQuizEvent) -> Result<(), JsValue> {
        let Some(listener) = self.listener.as_ref() else {
            return Ok(());
        };
        listener.call2(&JsValue::NULL, &JsValue::from_str(event.name()), &to_js(event)?)?;
        Ok(())
    }

    fn arm_timeout(shared: &Rc<Self>) {
        let (timeout, ticket) = {
            let controller = shared.controller.borrow();
            (
                controller.options().transition_timeout,
                controller.pending_transition(),
            )
        };
        let (Some(millis), Some(ticket)) = (timeout, ticket) else {
            return;
        };
        if shared.armed.replace(ticket) == ticket {
            return;
        }
        let weak: Weak<Shared> = Rc::downgrade(shared);
        Timeout::new(millis, move || {
            if let Some(shared) = weak.upgrade() {
                if let Ok(mut controller) = shared.controller.try_borrow_mut() {
                    controller.expire_transition(ticket);
                }
            }
        })
        .forget();
    }

    fn read<T>(&self, query: impl FnOnce(&Controller) -> T) -> Result<T, JsValue> {
        let controller = self
            .controller
            .try_borrow()
            .map_err(|_| JsValue::from_str("[CardsQuiz] busy"))?;
        Ok(query(&controller))
    }
}

/// 浏览器侧的翻卡问答组件。
///
/// 监听函数以 `(eventName, payload)` 调用；事件名为 `cardsQuiz:cardFlip`、
/// `cardsQuiz:questionChange`、`cardsQuiz:end`。
#[wasm_bindgen]
pub struct CardsQuizWidget {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl CardsQuizWidget {
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsValue,
        cards: JsValue,
        host: JsHost,
        listener: Option<Function>,
    ) -> Result<CardsQuizWidget, JsValue> {
        let options: CardsQuizOptions = if options.is_null() || options.is_undefined() {
            CardsQuizOptions::default()
        } else {
            from_value(options).map_err(JsValue::from)?
        };
        let cards: Vec<CardElement> = from_value(cards).map_err(JsValue::from)?;
        let mut host = JsWidgetHost(host);
        let controller = CardsQuiz::new(options, &cards, &mut host).map_err(to_js_error)?;

        let shared = Rc::new(Shared {
            controller: RefCell::new(controller),
            queue: RefCell::new(VecDeque::new()),
            draining: Cell::new(false),
            armed: Cell::new(0),
            listener,
        });
        Ok(CardsQuizWidget { shared })
    }

    /// 按问题 id（字符串）或下标（数字）激活卡片；`null`/`undefined` 取消当前卡片。
    pub fn activate(&self, target: JsValue) -> Result<(), JsValue> {
        let target = if target.is_null() || target.is_undefined() {
            None
        } else {
            match target_from_js(&target) {
                Some(target) => Some(target),
                None => {
                    utils::warn("[CardsQuiz] activate expects a question id or an index");
                    return Ok(());
                }
            }
        };
        Shared::submit(&self.shared, CardsQuizInput::Activate { target })?;
        Ok(())
    }

    #[wasm_bindgen(js_name = onCardClick)]
    pub fn on_card_click(&self, card: String) -> Result<(), JsValue> {
        Shared::submit(&self.shared, CardsQuizInput::CardClick { card })?;
        Ok(())
    }

    #[wasm_bindgen(js_name = onCardFlip)]
    pub fn on_card_flip(&self, card: String) -> Result<(), JsValue> {
        Shared::submit(&self.shared, CardsQuizInput::CardFlipped { card })?;
        Ok(())
    }

    #[wasm_bindgen(js_name = onQuestionShown)]
    pub fn on_question_shown(&self) -> Result<(), JsValue> {
        Shared::submit(&self.shared, CardsQuizInput::QuestionShown)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = onOptionChange)]
    pub fn on_option_change(
        &self,
        question_id: String,
        option_id: String,
        option_value: Option<String>,
        runtime: JsValue,
    ) -> Result<(), JsValue> {
        let runtime: QuestionRuntime = if runtime.is_null() || runtime.is_undefined() {
            QuestionRuntime::default()
        } else {
            from_value(runtime).map_err(JsValue::from)?
        };
        let change = OptionChange {
            question_id,
            option_id,
            option_value,
            runtime,
        };
        Shared::submit(&self.shared, CardsQuizInput::OptionChanged { change })?;
        Ok(())
    }

    #[wasm_bindgen(js_name = onQuizEnd)]
    pub fn on_quiz_end(&self, evaluation: JsValue) -> Result<(), JsValue> {
        let evaluation: Value = if evaluation.is_undefined() {
            Value::Null
        } else {
            from_value(evaluation).map_err(JsValue::from)?
        };
        Shared::submit(&self.shared, CardsQuizInput::QuizEnded { evaluation })?;
        Ok(())
    }

    pub fn enable(&self) -> Result<(), JsValue> {
        Shared::submit(&self.shared, CardsQuizInput::Enable)?;
        Ok(())
    }

    pub fn disable(&self) -> Result<(), JsValue> {
        Shared::submit(&self.shared, CardsQuizInput::Disable)?;
        Ok(())
    }

    /// 处理一条 JSON 格式的输入，返回本次产生的事件（JSON 数组）。
    pub fn dispatch_json(&self, input_json: &str) -> Result<String, JsValue> {
        let input: CardsQuizInput = serde_json::from_str(input_json).map_err(serde_to_js_error)?;
        let events = Shared::submit(&self.shared, input)?;
        serde_json::to_string(&events).map_err(serde_to_js_error)
    }

    #[wasm_bindgen(js_name = isDisabled)]
    pub fn is_disabled(&self) -> Result<bool, JsValue> {
        self.shared.read(|controller| controller.is_disabled())
    }

    #[wasm_bindgen(js_name = isTransitioning)]
    pub fn is_transitioning(&self) -> Result<bool, JsValue> {
        self.shared.read(|controller| controller.is_transitioning())
    }

    #[wasm_bindgen(js_name = activeCard)]
    pub fn active_card(&self) -> Result<Option<String>, JsValue> {
        self.shared.read(|controller| {
            controller
                .active_card()
                .map(|card| card.id().to_string())
        })
    }

    /// 卡片快照；未知 id 返回 `undefined`。
    pub fn card(&self, card: &str) -> Result<JsValue, JsValue> {
        let snapshot = self
            .shared
            .read(|controller| controller.card(card).map(|record| record.snapshot()))?;
        match snapshot {
            Some(snapshot) => to_js(&snapshot),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn cards(&self) -> Result<JsValue, JsValue> {
        let snapshots = self.shared.read(|controller| {
            controller
                .cards()
                .map(|record| record.snapshot())
                .collect::<Vec<_>>()
        })?;
        to_js(&snapshots)
    }

    #[wasm_bindgen(js_name = rootClasses)]
    pub fn root_classes(&self) -> Result<JsValue, JsValue> {
        let classes = self
            .shared
            .read(|controller| controller.root_classes().clone())?;
        to_js(&classes)
    }

    #[wasm_bindgen(js_name = quizClasses)]
    pub fn quiz_classes(&self) -> Result<JsValue, JsValue> {
        let classes = self
            .shared
            .read(|controller| controller.quiz_classes().clone())?;
        to_js(&classes)
    }

    #[wasm_bindgen(js_name = cardsClasses)]
    pub fn cards_classes(&self) -> Result<JsValue, JsValue> {
        let classes = self
            .shared
            .read(|controller| controller.cards_classes().clone())?;
        to_js(&classes)
    }

    pub fn options(&self) -> Result<JsValue, JsValue> {
        let options = self.shared.read(|controller| controller.options().clone())?;
        to_js(&options)
    }
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
