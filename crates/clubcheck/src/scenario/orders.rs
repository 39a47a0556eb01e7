//! Order history: viewing, editing the recipient, cancelling.

use super::{ensure, mentions_any, require, ScenarioContext, ScenarioGroup};
use crate::page::orders::{is_cancellable_status, is_shipped_status};
use crate::page::PageObject;
use crate::result::{ClubError, ClubResult};
use chrono::Utc;
use futures::future::BoxFuture;
use tracing::{info, warn};

const SUCCESS: [&str; 2] = ["thành công", "success"];
const CANCELLED: [&str; 3] = ["thành công", "success", "huỷ"];
const CANNOT_CANCEL: [&str; 3] = ["không thể", "cannot", "đã vận chuyển"];

#[must_use]
pub fn group() -> ScenarioGroup {
    ScenarioGroup::new("orders")
        .with_setup(sign_in)
        .scenario("view_orders", "the profile lists purchased orders", view_orders)
        .scenario("order_detail", "an order shows its status and detail", order_detail)
        .scenario("cancelled_tab", "cancelled orders have their own tab", cancelled_tab)
        .scenario("edit_recipient", "an unshipped order accepts a new recipient", edit_recipient)
        .scenario("shipped_not_editable", "a shipped order cannot be edited", shipped_not_editable)
        .scenario("cancel_asks_confirmation", "cancelling asks for confirmation first", cancel_asks_confirmation)
        .scenario("cancel_order", "a confirmed cancel moves the order to cancelled", cancel_order)
        .scenario("shipped_not_cancellable", "a shipped order cannot be cancelled", shipped_not_cancellable)
}

fn sign_in(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(ctx.sign_in_as_user())
}

/// Open the orders tab; skips the scenario when there are no orders
async fn open_with_orders(ctx: &ScenarioContext) -> ClubResult<usize> {
    ctx.orders.open().await?;
    let count = ctx.orders.order_count().await;
    require(count > 0, "no orders for this user")?;
    Ok(count)
}

/// First order whose status satisfies `pred`
async fn find_order(
    ctx: &ScenarioContext,
    count: usize,
    pred: fn(&str) -> bool,
) -> Option<(usize, String)> {
    for index in 0..count {
        let status = ctx.orders.order_status(index).await;
        if pred(&status) {
            return Some((index, status));
        }
    }
    None
}

fn view_orders(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.orders.open().await?;
        let url = ctx.ui.current_url().await?;
        ensure(url.contains("nguoidung.html"), format!("orders opened on {url}"))?;
        let orders = ctx.orders.order_count().await;
        info!(orders, "orders listed");
        Ok(())
    })
}

fn order_detail(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        open_with_orders(ctx).await?;
        let status = ctx.orders.order_status(0).await;
        ensure(!status.is_empty(), "first order has no status")?;

        ctx.orders.click_view_detail(0).await?;
        ctx.wait_url_any(&["order-detail", "nguoidung"]).await?;
        Ok(())
    })
}

fn cancelled_tab(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.orders.open().await?;
        if !ctx.orders.click_cancelled_tab().await {
            info!("no cancelled tab");
        }
        Ok(())
    })
}

fn edit_recipient(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        open_with_orders(ctx).await?;
        if !ctx.orders.can_edit_order(0).await {
            info!("first order cannot be edited");
            return Ok(());
        }

        ctx.orders.click_edit_order(0).await?;
        let stamp = Utc::now().timestamp_millis();
        let name = format!("Edited Name {stamp}");
        let address = format!("Edited Address {stamp}");
        if let Err(e) = ctx.orders.edit_recipient_info(Some(&name), Some(&address)).await {
            warn!(error = %e, "edit form not available");
            return Ok(());
        }

        let message = ctx.orders.success_message().await;
        ensure(
            message.is_empty() || mentions_any(&message, &SUCCESS),
            format!("unexpected edit message '{message}'"),
        )
    })
}

fn shipped_not_editable(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        let count = open_with_orders(ctx).await?;
        let Some((index, status)) = find_order(ctx, count, is_shipped_status).await else {
            return Err(ClubError::precondition("no shipped orders"));
        };
        ensure(
            !ctx.orders.can_edit_order(index).await,
            format!("order {index} ({status}) is still editable"),
        )
    })
}

fn cancel_asks_confirmation(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        let count = open_with_orders(ctx).await?;
        let Some((index, _)) = find_order(ctx, count, is_cancellable_status).await else {
            return Err(ClubError::precondition("no cancellable orders"));
        };

        ctx.orders.click_cancel_order(index).await?;
        let outcome = ctx.orders.confirm_cancellation().await?;
        info!(index, ?outcome, "cancel confirmed");
        ensure(outcome.is_resolved(), "cancel went through without a confirmation")
    })
}

fn cancel_order(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        let count = open_with_orders(ctx).await?;
        let Some((index, status)) = find_order(ctx, count, is_cancellable_status).await else {
            return Err(ClubError::precondition("no cancellable orders"));
        };
        info!(index, status = %status, "cancelling order");

        ctx.orders.cancel_with_confirmation(index).await?;
        let message = ctx.orders.success_message().await;
        ensure(
            message.is_empty() || mentions_any(&message, &CANCELLED),
            format!("unexpected cancel message '{message}'"),
        )?;

        ctx.orders.click_cancelled_tab().await;
        ensure(ctx.orders.order_count().await > 0, "cancelled list is empty")
    })
}

fn shipped_not_cancellable(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        let count = open_with_orders(ctx).await?;
        let Some((index, _)) = find_order(ctx, count, is_shipped_status).await else {
            return Err(ClubError::precondition("no shipped orders"));
        };

        if let Err(e) = ctx.orders.click_cancel_order(index).await {
            info!(error = %e, "no cancel control for a shipped order");
            return Ok(());
        }
        let message = ctx.orders.error_message().await;
        ensure(
            message.is_empty() || mentions_any(&message, &CANNOT_CANCEL),
            format!("unexpected cancel message '{message}'"),
        )
    })
}
