//! Browsing, buying, search and checkout payment.

use super::{ensure, mentions_any, ScenarioContext, ScenarioGroup};
use crate::page::confirm::DIALOG_TIMEOUT;
use crate::page::PageObject;
use crate::result::ClubResult;
use crate::testdata::{checkout_data, CheckoutData};
use futures::future::BoxFuture;
use tracing::info;

const ADDED_TO_CART: [&str; 3] = ["giỏ hàng", "cart", "thành công"];

#[must_use]
pub fn group() -> ScenarioGroup {
    ScenarioGroup::new("shopping")
        .with_setup(sign_in)
        .scenario("product_detail", "a product card opens its detail page", product_detail)
        .scenario("buy_product", "buying adds to the cart and checkout opens", buy_product)
        .scenario("back_from_detail", "back returns from product detail", back_from_detail)
        .scenario("search_products", "the home search accepts a keyword", search_products)
        .scenario("search_players", "the players page is reachable and searchable", search_players)
        .scenario("payment_qr_banking", "bank transfer shows a QR code", payment_banking)
        .scenario("payment_qr_momo", "MoMo shows a QR code", payment_momo)
        .scenario("payment_cod", "cash on delivery hides the QR code", payment_cod)
}

fn sign_in(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(ctx.sign_in_as_user())
}

/// Home, first product, detail page
async fn open_first_product(ctx: &ScenarioContext) -> ClubResult<()> {
    ctx.home.open().await?;
    ensure(ctx.home.product_count().await > 0, "home page shows no products")?;
    ctx.home.click_first_product().await?;
    ctx.ui.wait().wait_url_contains("chitiet_sp.html", None).await?;
    Ok(())
}

fn product_detail(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        open_first_product(ctx).await?;
        let image = &ctx.product_detail.locators().image;
        ctx.ui.wait().wait_visible(image, None).await?;
        ensure(ctx.product_detail.is_product_image_displayed().await, "product image not shown")
    })
}

fn buy_product(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        open_first_product(ctx).await?;
        let name = ctx.product_detail.product_name().await;
        ensure(!name.is_empty(), "product name is empty")?;

        ctx.product_detail.click_buy_button().await?;
        match ctx.ui.wait().wait_alert(Some(DIALOG_TIMEOUT)).await {
            Ok(dialog) => {
                ensure(
                    mentions_any(dialog.message(), &ADDED_TO_CART),
                    format!("unexpected add-to-cart alert '{}'", dialog.message()),
                )?;
                ctx.ui.session().accept_dialog().await?;
            }
            Err(e) if e.is_timeout() => info!("no add-to-cart alert"),
            Err(e) => return Err(e),
        }

        ctx.cart.open().await?;
        if ctx.cart.is_cart_empty().await {
            info!(product = %name, "cart still empty after buying");
        }

        ctx.cart.open_checkout().await?;
        ctx.ui.wait().wait_url_contains("thanhtoan.html", None).await?;
        Ok(())
    })
}

fn back_from_detail(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        open_first_product(ctx).await?;
        ctx.product_detail.click_back_button().await?;
        ctx.wait_url_any(&["trangchu", "danhmuc_sp"]).await?;
        Ok(())
    })
}

fn search_products(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.home.open().await?;
        if !ctx.home.search("áo").await? {
            info!("home page has no search box");
        }
        Ok(())
    })
}

fn search_players(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.home.open().await?;
        ctx.home.click_players_link().await?;
        ctx.ui.wait().wait_url_contains("user.html", None).await?;
        if !ctx.home.search("tuyển thủ").await? {
            info!("players page has no search box");
        }
        Ok(())
    })
}

/// Checkout, fill, choose `method`
async fn checkout_with(ctx: &ScenarioContext, data: &CheckoutData, method: &str) -> ClubResult<()> {
    ctx.cart.open_checkout().await?;
    ctx.cart.fill_checkout_form(data).await?;
    ctx.cart.select_payment_method(method).await?;
    Ok(())
}

/// The QR section and its image must show up
async fn expect_qr(ctx: &ScenarioContext, method: &str) -> ClubResult<()> {
    let l = ctx.cart.locators();
    ctx.ui.wait().wait_visible(&l.qr_section, None).await?;
    ensure(ctx.cart.is_qr_section_visible().await, format!("no QR section for {method}"))?;
    ctx.ui.wait().wait_visible(&l.qr_image, None).await?;
    ensure(ctx.cart.is_qr_image_displayed().await, format!("no QR image for {method}"))
}

fn payment_banking(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        checkout_with(ctx, &checkout_data(), "banking").await?;
        expect_qr(ctx, "banking").await
    })
}

fn payment_momo(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        let data = CheckoutData {
            address: Some("123 Test Street".to_string()),
            note: None,
            ..checkout_data()
        };
        checkout_with(ctx, &data, "momo").await?;
        expect_qr(ctx, "momo").await
    })
}

fn payment_cod(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.cart.open_checkout().await?;
        ctx.cart.select_payment_method("cod").await?;
        let qr = &ctx.cart.locators().qr_section;
        ctx.ui.wait().wait_invisible(qr, None).await?;
        ensure(!ctx.cart.is_qr_section_visible().await, "QR section shown for cash on delivery")
    })
}
