//! 外部协作者（翻转组件、问答引擎）的接口，以及通用的启用/禁用能力。

use serde_json::Value;

use super::card::CardElement;

/// 单张卡片的翻转动画组件。
pub trait FlipWidget {
    /// 翻到“揭示”面。
    fn flip(&mut self);
    /// 翻回“隐藏”面。
    fn unflip(&mut self);
    fn is_flipped(&self) -> bool;
}

/// 问答引擎。只暴露控制器需要驱动的操作，事件由嵌入层转发进来。
pub trait QuizEngine {
    /// 跳转到指定问题；`None` 表示不显示任何问题。
    fn navigate_to(&mut self, question: Option<&str>);
    fn enable(&mut self);
    fn disable(&mut self);
}

/// 负责创建协作者实例的宿主（浏览器中由 JS 胶水代码实现）。
pub trait WidgetHost {
    type Flip: FlipWidget;
    type Quiz: QuizEngine;

    fn create_quiz(&mut self, options: &Value) -> Self::Quiz;

    /// 解除元素上已有的翻转绑定，保证重复初始化时不会叠加。
    fn detach_flip(&mut self, element: &CardElement);

    /// 返回 `None` 表示该元素无法绑定翻转组件。
    fn create_flip(&mut self, element: &CardElement, options: &Value) -> Option<Self::Flip>;
}

/// 所有组件共享的状态。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetBase {
    disabled: bool,
}

impl WidgetBase {
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// 可启用/禁用的组件：通用部分由 [`WidgetBase`] 处理，具体组件只提供自己的附加行为。
pub trait Switchable {
    fn base_mut(&mut self) -> &mut WidgetBase;
    fn on_enable(&mut self);
    fn on_disable(&mut self);
}

/// 先执行通用启用逻辑，再执行组件自身的启用逻辑。
pub fn enable<W: Switchable + ?Sized>(widget: &mut W) {
    widget.base_mut().disabled = false;
    widget.on_enable();
}

/// 先执行通用禁用逻辑，再执行组件自身的禁用逻辑。
pub fn disable<W: Switchable + ?Sized>(widget: &mut W) {
    widget.base_mut().disabled = true;
    widget.on_disable();
}
