//-----------------------------------------------------------------------------
// Shared fixtures for component tests
//-----------------------------------------------------------------------------

#![allow(dead_code)]

use std::sync::Arc;

use waypoint_component::{
    ComponentClass, GenericComponent, MethodParam, NodeId, PersistentParam, Presenter, RequestRoot, SignalMethod,
};
use waypoint_core::{AppRequest, LinkArgs, ParamValue, RequestHandler};
use waypoint_error::Error;

/// Chart nested in a poll; ignores signals
pub fn chart_class() -> Arc<ComponentClass> {
    ComponentClass::builder("Chart")
        .persistent(PersistentParam::new("zoom", 1))
        .not_signal_receiver()
        .build()
}

/// Poll with a paged result list and a vote signal
pub fn poll_class() -> Arc<ComponentClass> {
    ComponentClass::builder("Poll")
        .persistent(PersistentParam::new("page", 1))
        .persistent(PersistentParam::untyped("filter"))
        .signal(
            SignalMethod::new("vote", |ctx, args| {
                let poll = ctx
                    .component_mut::<GenericComponent>()
                    .ok_or_else(|| Error::internal("poll state"))?;
                poll.set_field("voted", args[0].clone());
                poll.set_field("weight", args[1].clone());
                Ok(())
            })
            .param(MethodParam::required("id"))
            .param(MethodParam::optional("weight", 1)),
        )
        .signal(SignalMethod::new("reset", |ctx, _| {
            if let Some(poll) = ctx.component_mut::<GenericComponent>() {
                poll.set_field("page", 1);
            }
            ctx.redirect("this", LinkArgs::new())
        }))
        .signal(SignalMethod::new("secret", |_, _| Ok(())).hidden())
        .component("chart", |_| Box::new(GenericComponent::new(chart_class())))
        .build()
}

/// Presenter class owning a lazily created poll
pub fn article_class() -> Arc<ComponentClass> {
    ComponentClass::builder("ArticlePresenter")
        .persistent(PersistentParam::new("lang", "en"))
        .signal(SignalMethod::new("refresh", |ctx, _| {
            if let Some(presenter) = ctx.component_mut::<GenericComponent>() {
                presenter.set_field("refreshed", true);
            }
            Ok(())
        }))
        .component("poll", |_| Box::new(GenericComponent::new(poll_class())))
        .build()
}

pub fn presenter() -> Presenter {
    Presenter::new(Box::new(GenericComponent::new(article_class())))
}

/// Presenter that already served `Front:Article` with `params`
pub fn running_presenter(params: &[(&str, &str)]) -> Presenter {
    let mut presenter = presenter();
    let mut request = AppRequest::new("Front:Article");
    for (key, value) in params {
        request = request.with_param(*key, *value);
    }
    presenter.run(request).unwrap();
    presenter
}

/// The poll beneath the presenter, created on first access
pub fn poll(presenter: &mut Presenter) -> NodeId {
    presenter.component("poll", true).unwrap().unwrap()
}

/// Current value of a generic component's field
pub fn field(presenter: &Presenter, node: NodeId, name: &str) -> ParamValue {
    presenter
        .tree()
        .downcast::<GenericComponent>(node)
        .unwrap()
        .field(name)
        .cloned()
        .unwrap_or_default()
}

pub fn set_field(presenter: &mut Presenter, node: NodeId, name: &str, value: impl Into<ParamValue>) {
    presenter
        .tree_mut()
        .downcast_mut::<GenericComponent>(node)
        .unwrap()
        .set_field(name, value);
}
