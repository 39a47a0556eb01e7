//! Admin player table and player form.

use super::confirm::{ConfirmOutcome, ConfirmSurface};
use super::{Interactable, PageObject, MESSAGE_TIMEOUT, READ_TIMEOUT};
use crate::config::PageKey;
use crate::locator::Locator;
use crate::result::ClubResult;
use crate::session::ElementHandle;
use crate::testdata::PlayerData;
use tracing::{debug, warn};

/// Markers of the "no players" placeholder row
const PLACEHOLDER_MARKERS: [&str; 2] = ["Chưa có", "không"];

/// Column holding the player's name
const NAME_COLUMN: usize = 2;

/// Admin players locators
#[derive(Debug, Clone)]
pub struct AdminPlayersLocators {
    pub search_input: Locator,
    pub add_new_button: Locator,
    pub data_table: Locator,
    pub table_rows: Locator,
    pub table_cells: Locator,
    pub edit_buttons: Locator,
    pub delete_buttons: Locator,
    pub confirm_modal: Locator,
    pub confirm_button: Locator,
    pub full_name: Locator,
    pub nickname: Locator,
    pub position: Locator,
    pub specialty: Locator,
    pub age: Locator,
    pub achievements: Locator,
    pub bio: Locator,
    pub image_url: Locator,
    pub image_file: Locator,
    pub save_button: Locator,
    pub cancel_button: Locator,
    pub success_message: Locator,
}

impl Default for AdminPlayersLocators {
    fn default() -> Self {
        Self {
            search_input: Locator::css(".search-input, input[type=\"text\"]"),
            add_new_button: Locator::css(".btn-add-new, button[onclick*=\"addtt_admin\"]"),
            data_table: Locator::css(".data-table"),
            table_rows: Locator::css(".data-table tbody tr"),
            table_cells: Locator::css("td"),
            edit_buttons: Locator::css(".btn-edit-admin, button[onclick*=\"editItem\"]"),
            delete_buttons: Locator::css(".btn-delete-admin, button[onclick*=\"deleteItem\"]"),
            confirm_modal: Locator::css(".modal, .confirm-dialog"),
            confirm_button: Locator::css(".confirm-yes, .btn-confirm"),
            full_name: Locator::id("full_name"),
            nickname: Locator::id("nickname"),
            position: Locator::id("position"),
            specialty: Locator::id("specialty"),
            age: Locator::id("age"),
            achievements: Locator::id("achievements"),
            bio: Locator::id("bio"),
            image_url: Locator::id("image_url"),
            image_file: Locator::css("input[type=\"file\"]"),
            save_button: Locator::css(".btn-save, button[type=\"submit\"]"),
            cancel_button: Locator::css(".btn-cancel, button[onclick*=\"back\"]"),
            success_message: Locator::css(".success-msg, .alert-success"),
        }
    }
}

/// Admin player table and player form
#[derive(Debug, Clone)]
pub struct AdminPlayersPage {
    ui: Interactable,
    locators: AdminPlayersLocators,
    confirm: ConfirmSurface,
}

impl PageObject for AdminPlayersPage {
    fn page_key(&self) -> PageKey {
        PageKey::AdminPlayers
    }

    fn ui(&self) -> &Interactable {
        &self.ui
    }
}

fn is_data_row(text: &str) -> bool {
    !text.trim().is_empty() && !PLACEHOLDER_MARKERS.iter().any(|m| text.contains(m))
}

impl AdminPlayersPage {
    #[must_use]
    pub fn new(ui: Interactable) -> Self {
        let locators = AdminPlayersLocators::default();
        let confirm = ConfirmSurface::new(
            locators.confirm_modal.clone(),
            locators.confirm_button.clone(),
        );
        Self {
            ui,
            locators,
            confirm,
        }
    }

    #[must_use]
    pub const fn locators(&self) -> &AdminPlayersLocators {
        &self.locators
    }

    pub async fn open_add_player_page(&self) -> ClubResult<()> {
        self.ui.open_page(PageKey::AdminAddPlayer).await
    }

    pub async fn click_add_new(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.add_new_button).await
    }

    /// Texts of the current rows that hold a player
    async fn data_rows(&self) -> ClubResult<Vec<String>> {
        let session = self.ui.session();
        let mut rows = Vec::new();
        for row in session.find_elements(&self.locators.table_rows).await? {
            let text = session.text(&row).await?;
            if is_data_row(&text) {
                rows.push(text);
            }
        }
        Ok(rows)
    }

    /// Players in the table, ignoring the placeholder row; `0` if the table
    /// never shows
    pub async fn player_count(&self) -> usize {
        if self
            .ui
            .wait()
            .wait_visible(&self.locators.table_rows, Some(READ_TIMEOUT))
            .await
            .is_err()
        {
            return 0;
        }
        self.data_rows().await.map_or(0, |rows| rows.len())
    }

    /// Type a search keyword and wait until the table only lists matches
    pub async fn search_player(&self, keyword: &str) -> ClubResult<()> {
        self.ui.type_into(&self.locators.search_input, keyword).await?;

        let needle = keyword.to_lowercase();
        let needle = needle.as_str();
        let settled = self
            .ui
            .wait()
            .wait_condition(
                &format!("rows filtered by '{keyword}'"),
                Some(READ_TIMEOUT),
                || async move {
                    let rows = self.data_rows().await?;
                    Ok(rows
                        .iter()
                        .all(|r| r.to_lowercase().contains(needle))
                        .then_some(rows.len()))
                },
            )
            .await;
        match settled {
            Ok(n) => debug!(keyword, rows = n, "search settled"),
            Err(e) if e.is_timeout() => warn!(keyword, "search results did not settle"),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Fill the set fields of the player form; unset fields keep what the
    /// form shows. Bio and image URL are skipped when the form lacks them.
    pub async fn fill_player_form(&self, data: &PlayerData) -> ClubResult<()> {
        let l = &self.locators;
        for (locator, value) in [
            (&l.full_name, &data.full_name),
            (&l.nickname, &data.nickname),
            (&l.position, &data.position),
            (&l.specialty, &data.specialty),
            (&l.age, &data.age),
            (&l.achievements, &data.achievements),
        ] {
            if let Some(value) = value {
                self.ui.type_into(locator, value).await?;
            }
        }
        for (locator, value) in [(&l.bio, &data.bio), (&l.image_url, &data.image_url)] {
            if let Some(value) = value {
                self.ui.type_if_present(locator, value).await?;
            }
        }
        Ok(())
    }

    /// Attach a local file; `false` when the form has no file input
    pub async fn upload_image(&self, path: &std::path::Path) -> ClubResult<bool> {
        let input = match self
            .ui
            .wait()
            .wait_present(&self.locators.image_file, Some(READ_TIMEOUT))
            .await
        {
            Ok(handle) => handle,
            Err(e) if e.is_timeout() => {
                debug!("file upload not available");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        self.ui
            .session()
            .send_keys(&input, &path.to_string_lossy())
            .await?;
        Ok(true)
    }

    pub async fn click_save(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.save_button).await
    }

    pub async fn click_cancel(&self) -> ClubResult<()> {
        self.ui.safe_click(&self.locators.cancel_button).await
    }

    pub async fn add_player(&self, data: &PlayerData) -> ClubResult<()> {
        self.fill_player_form(data).await?;
        self.click_save().await
    }

    pub async fn click_edit_player(&self, index: usize) -> ClubResult<()> {
        self.ui
            .click_nth(&self.locators.edit_buttons, index, "edit player")
            .await
    }

    pub async fn click_delete_player(&self, index: usize) -> ClubResult<()> {
        self.ui
            .click_nth(&self.locators.delete_buttons, index, "delete player")
            .await
    }

    /// Accept the delete confirmation. Lenient: when nothing appears the
    /// delete is assumed to have gone through directly.
    pub async fn confirm_deletion(&self) -> ClubResult<ConfirmOutcome> {
        let outcome = self.confirm.resolve(&self.ui, "delete player").await?;
        if !outcome.is_resolved() {
            debug!("no confirmation dialog, assuming direct deletion");
        }
        Ok(outcome)
    }

    /// Delete row `index`, confirm, wait for the row to go, reload.
    ///
    /// Returns the player count from before the delete.
    pub async fn delete_player_with_confirmation(&self, index: usize) -> ClubResult<usize> {
        let initial = self.player_count().await;
        self.click_delete_player(index).await?;
        self.confirm_deletion().await?;

        let removed = self
            .ui
            .wait()
            .wait_condition("player row removed", None, || async move {
                Ok((self.data_rows().await?.len() < initial).then_some(()))
            })
            .await;
        if let Err(e) = removed {
            if !e.is_timeout() {
                return Err(e);
            }
            warn!(initial, "row count did not drop after delete");
        }

        self.ui.refresh().await?;
        Ok(initial)
    }

    pub async fn success_message(&self) -> String {
        self.ui
            .visible_text(&self.locators.success_message, MESSAGE_TIMEOUT)
            .await
    }

    /// Name cell of row `index`, empty when the row or cell is missing
    pub async fn player_name_from_table(&self, index: usize) -> ClubResult<String> {
        if self
            .ui
            .wait()
            .wait_visible(&self.locators.table_rows, Some(READ_TIMEOUT))
            .await
            .is_err()
        {
            return Ok(String::new());
        }
        let session = self.ui.session();
        let rows = session.find_elements(&self.locators.table_rows).await?.len();
        if index >= rows {
            return Ok(String::new());
        }
        let row = ElementHandle::new(self.locators.table_rows.clone(), index);
        let cells = session.child_texts(&row, &self.locators.table_cells).await?;
        Ok(cells.into_iter().nth(NAME_COLUMN).unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockDom, MockElement, MockSession};
    use crate::page::confirm::ConfirmOutcome;
    use crate::page::tests::fixture;
    use crate::testdata::player_data;

    fn player_row(l: &AdminPlayersLocators, id: usize, name: &str) -> MockElement {
        MockElement::new(l.table_rows.clone())
            .with_text(format!("{id} img {name} Bơi ngửa"))
            .with_child(l.table_cells.clone(), id.to_string())
            .with_child(l.table_cells.clone(), "img")
            .with_child(l.table_cells.clone(), name)
    }

    fn render_table(dom: &mut MockDom, names: &[String]) {
        let l = AdminPlayersLocators::default();
        dom.add(MockElement::new(l.data_table.clone()));
        dom.add(MockElement::new(l.search_input.clone()));
        if names.is_empty() {
            dom.add(MockElement::new(l.table_rows.clone()).with_text("Chưa có tuyển thủ nào"));
        }
        for (i, name) in names.iter().enumerate() {
            dom.add(player_row(&l, i + 1, name));
            dom.add(MockElement::new(l.edit_buttons.clone()));
            dom.add(MockElement::new(l.delete_buttons.clone()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_skips_placeholder() {
        let (mock, ui) = fixture();
        mock.with_dom(|dom| render_table(dom, &[]));
        let page = AdminPlayersPage::new(ui);
        assert_eq!(page.player_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_zero_without_table() {
        let (_, ui) = fixture();
        assert_eq!(AdminPlayersPage::new(ui).player_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_name_from_third_column() {
        let (mock, ui) = fixture();
        mock.with_dom(|dom| render_table(dom, &["Ánh Viên".into(), "Huy Hoàng".into()]));
        let page = AdminPlayersPage::new(ui);
        assert_eq!(page.player_count().await, 2);
        assert_eq!(page.player_name_from_table(1).await.unwrap(), "Huy Hoàng");
        assert_eq!(page.player_name_from_table(5).await.unwrap(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fill_form_tolerates_missing_optional_fields() {
        let (mock, ui) = fixture();
        let l = AdminPlayersLocators::default();
        for loc in [&l.full_name, &l.nickname, &l.position, &l.specialty, &l.age, &l.achievements] {
            mock.add_element(MockElement::new(loc.clone()));
        }
        let page = AdminPlayersPage::new(ui);
        let data = player_data();

        page.fill_player_form(&data).await.unwrap();

        assert_eq!(Some(mock.value_of(&l.full_name)), data.full_name);
        assert_eq!(mock.value_of(&l.position), "Bơi ngửa");
        assert!(!mock.was_called("send_keys:By.id(bio)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fill_form_keeps_unset_name() {
        let (mock, ui) = fixture();
        let l = AdminPlayersLocators::default();
        mock.add_element(MockElement::new(l.full_name.clone()).with_value("Nguyễn Thị Ánh Viên"));
        mock.add_element(MockElement::new(l.nickname.clone()));
        let page = AdminPlayersPage::new(ui);
        let data = PlayerData {
            nickname: Some("Kình ngư".into()),
            ..PlayerData::default()
        };

        page.fill_player_form(&data).await.unwrap();

        assert_eq!(mock.value_of(&l.full_name), "Nguyễn Thị Ánh Viên");
        assert_eq!(mock.value_of(&l.nickname), "Kình ngư");
        assert!(!mock.was_called(&format!("clear:{}", l.full_name)));
        assert!(!mock.was_called(&format!("send_keys:{}", l.full_name)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_image_degrades() {
        let (mock, ui) = fixture();
        let page = AdminPlayersPage::new(ui);
        assert!(!page.upload_image(std::path::Path::new("/tmp/a.png")).await.unwrap());
        mock.add_element(MockElement::new(page.locators().image_file.clone()).hidden());
        assert!(page.upload_image(std::path::Path::new("/tmp/a.png")).await.unwrap());
        assert_eq!(mock.value_of(&page.locators().image_file), "/tmp/a.png");
    }

    fn table_with_native_confirm(mock: &MockSession, names: Vec<String>) {
        let l = AdminPlayersLocators::default();
        let names = std::sync::Arc::new(std::sync::Mutex::new(names));
        let render = std::sync::Arc::clone(&names);
        mock.on_page("admin.html", move |dom, _| {
            if let Ok(names) = render.lock() {
                render_table(dom, &names);
            }
        });
        mock.on_click(l.delete_buttons.clone(), move |dom, index| {
            let names = std::sync::Arc::clone(&names);
            dom.open_confirm("Bạn có chắc muốn xóa?", move |dom| {
                if let Ok(mut names) = names.lock() {
                    names.remove(index);
                    render_table_rows_only(dom, &names);
                }
            });
        });
    }

    fn render_table_rows_only(dom: &mut MockDom, names: &[String]) {
        let l = AdminPlayersLocators::default();
        dom.remove(&l.table_rows);
        dom.remove(&l.edit_buttons);
        dom.remove(&l.delete_buttons);
        for (i, name) in names.iter().enumerate() {
            dom.add(player_row(&l, i + 1, name));
            dom.add(MockElement::new(l.edit_buttons.clone()));
            dom.add(MockElement::new(l.delete_buttons.clone()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_with_native_confirm_drops_one_row() {
        let (mock, ui) = fixture();
        table_with_native_confirm(&mock, vec!["A".into(), "B".into(), "C".into()]);
        let page = AdminPlayersPage::new(ui);
        page.open().await.unwrap();

        let initial = page.delete_player_with_confirmation(0).await.unwrap();

        assert_eq!(initial, 3);
        assert_eq!(page.player_count().await, 2);
        assert_eq!(page.player_name_from_table(0).await.unwrap(), "B");
        assert_eq!(mock.count_calls("accept_dialog"), 1);
        assert!(mock.was_called("refresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_deletion_is_lenient() {
        let (_, ui) = fixture();
        let page = AdminPlayersPage::new(ui);
        assert_eq!(
            page.confirm_deletion().await.unwrap(),
            ConfirmOutcome::Unresolved
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_out_of_range() {
        let (mock, ui) = fixture();
        mock.with_dom(|dom| render_table(dom, &["A".into()]));
        let page = AdminPlayersPage::new(ui);
        let err = page.click_delete_player(3).await.unwrap_err();
        assert!(matches!(
            err,
            crate::result::ClubError::ActionUnavailable { available: 1, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_settles_on_filtered_rows() {
        let (mock, ui) = fixture();
        let l = AdminPlayersLocators::default();
        mock.with_dom(|dom| render_table(dom, &["Ánh Viên".into()]));
        let page = AdminPlayersPage::new(ui);
        let start = tokio::time::Instant::now();

        page.search_player("viên").await.unwrap();

        assert_eq!(mock.value_of(&l.search_input), "viên");
        assert_eq!(start.elapsed(), std::time::Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_unfiltered_gives_up_quietly() {
        let (mock, ui) = fixture();
        mock.with_dom(|dom| render_table(dom, &["Ánh Viên".into(), "Huy Hoàng".into()]));
        let page = AdminPlayersPage::new(ui);
        let start = tokio::time::Instant::now();

        page.search_player("viên").await.unwrap();

        assert!(start.elapsed() >= READ_TIMEOUT);
    }
}
