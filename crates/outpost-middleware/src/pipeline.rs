//! Fixed-order stage pipeline.
//!
//! Outpost runs two stages:
//!
//! 1. **Dispatch**: match a resource, authorize, invoke the action
//! 2. **Render**: project headers, negotiate a format, serialize the entity
//!
//! Requests no resource claims run straight through both stages to the
//! terminal handler the host supplies.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased stage.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable chain of stages.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::builder()
///     .stage(dispatch)
///     .stage(render)
///     .build();
///
/// let response = pipeline
///     .process(MiddlewareContext::new(), request, |_ctx, req| {
///         Box::pin(async move { not_found(req) })
///     })
///     .await;
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs `request` through every stage, ending at `handler` if no stage
    /// short-circuits.
    pub async fn process<'h, H>(
        &self,
        mut ctx: MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'h, Response> + Send + 'h,
    {
        // The chain only lives for this call; the handler's future shortens to it.
        let terminal = move |c: &mut MiddlewareContext, r: Request| -> BoxFuture<'_, Response> {
            handler(c, r)
        };
        let next = self.build_chain(terminal);
        next.run(&mut ctx, request).await
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'a, Response> + Send + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the stage names in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// The stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Resource matching, authorization and action invocation.
    Dispatch = 1,
    /// Header projection, negotiation and serialization.
    Render = 2,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "dispatch",
            Self::Render => "render",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 2] {
        [Self::Dispatch, Self::Render]
    }
}
