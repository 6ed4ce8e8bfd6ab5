//! Keeps product shelf status in line with the steps that reference them.
//!
//! A product linked from a step is activated; once the last step referencing
//! it is deleted or relinked, it is handed back to the shelf. Reconciliation
//! runs after the step mutation has been stored and never undoes it: failures
//! are logged and swallowed.

use std::sync::Arc;

use log::{debug, warn};

use crate::{
    models::{ProductId, RoutineStep},
    store::ProductService,
};

/// Product status calls implied by one step mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    /// Product that is now referenced and should be active
    pub activate: Option<ProductId>,
    /// Product that lost a reference and should go back to the shelf
    pub release: Option<ProductId>,
}

impl LinkPlan {
    /// Computes the calls for a step whose link moved from `previous` to
    /// `current`. `remaining` are the steps after the mutation.
    pub fn between(
        previous: Option<&ProductId>,
        current: Option<&ProductId>,
        remaining: &[RoutineStep],
    ) -> Self {
        if previous == current {
            return Self::default();
        }
        let release = previous
            .filter(|old| {
                !remaining
                    .iter()
                    .any(|step| step.product_id.as_ref() == Some(*old))
            })
            .cloned();
        Self {
            activate: current.cloned(),
            release,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.activate.is_none() && self.release.is_none()
    }
}

/// Applies [`LinkPlan`]s against a [`ProductService`].
#[derive(Clone)]
pub struct ProductReconciler {
    service: Arc<dyn ProductService>,
}

impl ProductReconciler {
    pub fn new(service: Arc<dyn ProductService>) -> Self {
        Self { service }
    }

    /// A step was created, possibly linked to a product.
    pub async fn step_created(&self, step: &RoutineStep) {
        self.apply(LinkPlan::between(None, step.product_id.as_ref(), &[]))
            .await;
    }

    /// A step's product link changed from `previous` to the step's current one.
    pub async fn step_updated(
        &self,
        previous: Option<&ProductId>,
        step: &RoutineStep,
        remaining: &[RoutineStep],
    ) {
        self.apply(LinkPlan::between(
            previous,
            step.product_id.as_ref(),
            remaining,
        ))
        .await;
    }

    /// A step was deleted; `remaining` no longer contains it.
    pub async fn step_deleted(&self, step: &RoutineStep, remaining: &[RoutineStep]) {
        self.apply(LinkPlan::between(
            step.product_id.as_ref(),
            None,
            remaining,
        ))
        .await;
    }

    async fn apply(&self, plan: LinkPlan) {
        if plan.is_empty() {
            return;
        }
        if let Some(product_id) = &plan.release {
            debug!("Releasing product {product_id}");
            if let Err(e) = self.service.deactivate_if_unused(product_id).await {
                warn!("Failed to move product {product_id} back to the shelf: {e}");
            }
        }
        if let Some(product_id) = &plan.activate {
            debug!("Activating product {product_id}");
            if let Err(e) = self.service.activate(product_id).await {
                warn!("Failed to activate product {product_id}: {e}");
            }
        }
    }
}
