use std::rc::Rc;

use yew::prelude::*;

const TOAST_MILLIS: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    id: u32,
    kind: ToastKind,
    message: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Toasts {
    next_id: u32,
    items: Vec<Toast>,
}

pub enum ToastAction {
    Push(ToastKind, String),
    Dismiss(u32),
}

impl Reducible for Toasts {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ToastAction::Push(kind, message) => {
                next.items.push(Toast {
                    id: next.next_id,
                    kind,
                    message,
                });
                next.next_id = next.next_id.wrapping_add(1);
            }
            ToastAction::Dismiss(id) => next.items.retain(|t| t.id != id),
        }
        Rc::new(next)
    }
}

/// Handle for showing transient notifications.
#[derive(Clone, PartialEq)]
pub struct Toaster(Callback<ToastAction>);

impl Toaster {
    pub fn success(&self, message: impl Into<String>) {
        self.0.emit(ToastAction::Push(ToastKind::Success, message.into()));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.0.emit(ToastAction::Push(ToastKind::Error, message.into()));
    }
}

#[hook]
pub fn use_toaster() -> Toaster {
    use_context::<Toaster>().unwrap_or_else(|| {
        log::warn!("no ToastProvider mounted, notifications are dropped");
        Toaster(Callback::noop())
    })
}

#[derive(Properties, PartialEq)]
pub struct ProviderProps {
    #[prop_or_default]
    pub children: Html,
}

#[function_component(ToastProvider)]
pub fn toast_provider(props: &ProviderProps) -> Html {
    let toasts = use_reducer(Toasts::default);
    let toaster = {
        let dispatcher = toasts.dispatcher();
        use_memo((), move |_| {
            Toaster(Callback::from(move |action| dispatcher.dispatch(action)))
        })
    };
    let on_dismiss = {
        let toaster = toaster.clone();
        Callback::from(move |id| toaster.0.emit(ToastAction::Dismiss(id)))
    };

    html! {
        <ContextProvider<Toaster> context={(*toaster).clone()}>
            {props.children.clone()}
            <div class="toaster">
                { for toasts.items.iter().map(|toast| html! {
                    <ToastItem key={toast.id} toast={toast.clone()} on_dismiss={on_dismiss.clone()} />
                }) }
            </div>
        </ContextProvider<Toaster>>
    }
}

#[derive(Properties, PartialEq)]
struct ItemProps {
    toast: Toast,
    on_dismiss: Callback<u32>,
}

#[function_component(ToastItem)]
fn toast_item(props: &ItemProps) -> Html {
    let id = props.toast.id;
    {
        let on_dismiss = props.on_dismiss.clone();
        yew_hooks::use_timeout(move || on_dismiss.emit(id), TOAST_MILLIS);
    }
    let onclick = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_| on_dismiss.emit(id))
    };
    let class = match props.toast.kind {
        ToastKind::Success => "toast toast-success",
        ToastKind::Error => "toast toast-error",
    };

    html! {
        <div {class} {onclick}>{props.toast.message.clone()}</div>
    }
}
