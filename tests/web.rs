#![cfg(target_arch = "wasm32")]

use cards_quiz::{CardElement, CardsQuizWidget, JsHost};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::js_sys::{Array, Function, Reflect};

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r#"
const log = [];
const host = {
  createQuiz(options) {
    log.push("create quiz " + options.autoStart);
    return {
      goTo(q) { log.push("goto " + q); },
      enable() { log.push("quiz enable"); },
      disable() { log.push("quiz disable"); },
    };
  },
  detachFlip(card) { log.push("detach " + card.attributes["data-cq-question"]); },
  createFlip(card, options) {
    const id = card.attributes["data-cq-question"];
    log.push("create flip " + id + " " + options.trigger);
    return {
      isFlipped: false,
      flip() { this.isFlipped = true; log.push("flip " + id); },
      unflip() { this.isFlipped = false; log.push("unflip " + id); },
    };
  },
};
const listener = (name, payload) => log.push(name + " " + (payload.card ? payload.card.id : ""));
return { host, listener, log };
"#;

struct Fixture {
    host: JsHost,
    listener: Function,
    log: Array,
}

fn fixture() -> Fixture {
    let parts = Function::new_no_args(FIXTURE)
        .call0(&JsValue::NULL)
        .expect("fixture should build");
    let get = |key: &str| Reflect::get(&parts, &JsValue::from_str(key)).expect("fixture field");
    Fixture {
        host: get("host").unchecked_into(),
        listener: get("listener").dyn_into().expect("listener should be a function"),
        log: get("log").dyn_into().expect("log should be an array"),
    }
}

fn entries(log: &Array) -> Vec<String> {
    log.iter().filter_map(|value| value.as_string()).collect()
}

fn cards(questions: &[&str]) -> JsValue {
    let elements: Vec<CardElement> = questions.iter().map(|q| CardElement::new(*q)).collect();
    elements
        .serialize(&Serializer::json_compatible())
        .expect("cards should serialize")
}

#[wasm_bindgen_test]
fn flip_then_question_shown_settles_activation() {
    let Fixture { host, listener, log } = fixture();
    let widget = CardsQuizWidget::new(JsValue::UNDEFINED, cards(&["q1", "q2"]), host, Some(listener))
        .expect("widget should initialize");

    assert_eq!(
        entries(&log),
        vec!["create quiz true", "detach q1", "create flip q1 manual", "detach q2", "create flip q2 manual"]
    );
    log.set_length(0);

    widget.activate(JsValue::from_str("q2")).expect("activate");
    assert_eq!(entries(&log), vec!["flip q2"]);
    assert_eq!(widget.is_transitioning(), Ok(true));

    widget.on_card_flip("q2".to_string()).expect("flip done");
    assert_eq!(entries(&log), vec!["flip q2", "goto q2", "cardsQuiz:cardFlip q2"]);

    widget.on_question_shown().expect("question shown");
    assert_eq!(widget.is_transitioning(), Ok(false));
    assert_eq!(widget.active_card(), Ok(Some("q2".to_string())));
}

#[wasm_bindgen_test]
fn numeric_target_activates_matching_question() {
    let Fixture { host, log, .. } = fixture();
    let widget = CardsQuizWidget::new(JsValue::NULL, cards(&["1", "2", "3"]), host, None)
        .expect("widget should initialize");
    log.set_length(0);

    widget.activate(JsValue::from_f64(1.0)).expect("activate");

    assert_eq!(entries(&log), vec!["flip 1"]);
    assert_eq!(widget.active_card(), Ok(Some("1".to_string())));
}

#[wasm_bindgen_test]
fn container_classes_are_exposed() {
    let Fixture { host, .. } = fixture();
    let widget = CardsQuizWidget::new(JsValue::UNDEFINED, cards(&["q1"]), host, None)
        .expect("widget should initialize");

    let quiz: Vec<String> =
        serde_wasm_bindgen::from_value(widget.quiz_classes().expect("quiz classes")).expect("array");
    let cards: Vec<String> =
        serde_wasm_bindgen::from_value(widget.cards_classes().expect("cards classes")).expect("array");

    assert_eq!(quiz, vec!["c-cards-quiz__quiz"]);
    assert_eq!(cards, vec!["c-cards-quiz__cards"]);
}

#[wasm_bindgen_test]
fn quiz_end_disables_widget() {
    let Fixture { host, listener, log } = fixture();
    let widget = CardsQuizWidget::new(JsValue::UNDEFINED, cards(&["q1"]), host, Some(listener))
        .expect("widget should initialize");
    log.set_length(0);

    let events = widget
        .dispatch_json(r#"{"type": "QuizEnded", "evaluation": {"score": 1}}"#)
        .expect("dispatch");

    assert!(events.contains("\"QuizEnded\""));
    assert_eq!(entries(&log), vec!["quiz disable", "cardsQuiz:end "]);
    assert_eq!(widget.is_disabled(), Ok(true));
}

#[wasm_bindgen_test]
fn card_without_question_fails_construction() {
    let Fixture { host, .. } = fixture();
    let elements = vec![CardElement::default()];
    let cards = elements
        .serialize(&Serializer::json_compatible())
        .expect("cards should serialize");

    assert!(CardsQuizWidget::new(JsValue::UNDEFINED, cards, host, None).is_err());
}
