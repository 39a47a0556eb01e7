//! Admin player management: add, edit, delete.

use super::{ensure, ScenarioContext, ScenarioGroup};
use crate::page::PageObject;
use crate::result::{ClubError, ClubResult};
use crate::testdata::{player_data, PlayerData};
use chrono::Utc;
use futures::future::BoxFuture;
use tracing::debug;

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

#[must_use]
pub fn group() -> ScenarioGroup {
    ScenarioGroup::new("admin")
        .with_setup(sign_in_as_admin)
        .scenario("add_player_form", "the add form opens", add_player_form)
        .scenario("add_player", "a new player shows up in the table", add_player)
        .scenario("edit_player_form", "edit opens the player form", edit_player_form)
        .scenario("edit_player", "edited player stays listed", edit_player)
        .scenario("delete_player", "a confirmed delete removes one row", delete_player)
}

fn sign_in_as_admin(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        let admin = ctx.config().admin.clone();
        ctx.sign_in(&admin.email, &admin.password).await?;
        ctx.wait_logged_in().await?;
        let role = ctx.ui.auth().user_role().await?;
        if role.as_deref() == Some("admin") {
            Ok(())
        } else {
            Err(ClubError::assertion(format!(
                "admin login failed, stored role is {role:?}"
            )))
        }
    })
}

/// Wait for the save to be acknowledged: a banner or leaving the form
async fn await_save(ctx: &ScenarioContext) -> ClubResult<()> {
    let banner = ctx.admin_players.success_message().await;
    if banner.is_empty() {
        debug!("no save banner, waiting for the player list");
    }
    ctx.admin_players.open().await
}

fn add_player_form(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.admin_players.open_add_player_page().await?;
        ctx.ui.wait().wait_url_contains("addtt_admin.html", None).await?;
        Ok(())
    })
}

fn add_player(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        let player = PlayerData {
            image_url: Some(PLACEHOLDER_IMAGE.to_string()),
            ..player_data()
        };
        ctx.admin_players.open_add_player_page().await?;
        ctx.admin_players.add_player(&player).await?;
        await_save(ctx).await?;

        ensure(ctx.admin_players.player_count().await > 0, "player table is empty after adding")?;
        let name = player.full_name.unwrap_or_default();
        ctx.admin_players.search_player(&name).await?;
        ensure(
            ctx.admin_players.player_count().await > 0,
            format!("search found no '{name}'"),
        )
    })
}

fn edit_player_form(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.admin_players.open().await?;
        ensure(ctx.admin_players.player_count().await > 0, "no players to edit")?;
        ctx.admin_players.click_edit_player(0).await?;
        ctx.wait_url_any(&["addtt_admin", "edit"]).await?;
        Ok(())
    })
}

fn edit_player(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.admin_players.open().await?;
        ensure(ctx.admin_players.player_count().await > 0, "no players to edit")?;
        let name = ctx.admin_players.player_name_from_table(0).await?;

        ctx.admin_players.click_edit_player(0).await?;
        ctx.wait_url_any(&["addtt_admin", "edit"]).await?;

        let now = Utc::now();
        let edited = PlayerData {
            nickname: Some(format!("Updated {}", now.timestamp_millis())),
            achievements: Some(format!("Edited achievements at {}", now.format("%Y-%m-%d %H:%M:%S"))),
            ..PlayerData::default()
        };
        ctx.admin_players.fill_player_form(&edited).await?;
        ctx.admin_players.click_save().await?;
        await_save(ctx).await?;

        ensure(ctx.admin_players.player_count().await > 0, "player table is empty after editing")?;
        if name.is_empty() {
            return Ok(());
        }
        ctx.admin_players.search_player(&name).await?;
        ensure(
            ctx.admin_players.player_count().await > 0,
            format!("'{name}' is no longer listed after editing"),
        )
    })
}

fn delete_player(ctx: &ScenarioContext) -> BoxFuture<'_, ClubResult<()>> {
    Box::pin(async move {
        ctx.admin_players.open().await?;
        let before = ctx.admin_players.player_count().await;
        ensure(before > 0, "no players to delete")?;

        let initial = ctx.admin_players.delete_player_with_confirmation(0).await?;
        let after = ctx.admin_players.player_count().await;
        ensure(
            after < initial,
            format!("player count went from {initial} to {after}"),
        )
    })
}
