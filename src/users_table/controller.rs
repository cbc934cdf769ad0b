use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use super::api::{ApiError, UsersApi};
use super::model::{NewUser, User};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Loading,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Why a create/update/delete did not change the table.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("No hay conexión con el servidor. Por favor, verifica la conexión e intenta de nuevo.")]
    Disconnected,
    #[error("Error al crear el usuario. Por favor intenta de nuevo.")]
    Create(#[source] ApiError),
    #[error("Error al actualizar el usuario. Por favor intenta de nuevo.")]
    Update(#[source] ApiError),
    #[error("Error al eliminar el usuario. Por favor intenta de nuevo.")]
    Delete(#[source] ApiError),
}

/// Row counts for the footer and header of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub shown: usize,
    pub total: usize,
    pub connected: bool,
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl PageSummary {
    pub fn total_label(&self) -> String {
        if self.connected {
            format!("Total de {} usuario{}", self.total, plural(self.total))
        } else {
            "Esperando conexión...".to_string()
        }
    }
}

impl fmt::Display for PageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mostrando {} de {} usuario{}",
            self.shown,
            self.total,
            plural(self.total)
        )
    }
}

/// In-memory view of the usuarios collection.
///
/// Records are replaced wholesale on every successful load and patched only
/// after the proxy confirms a mutation, so a failed call never leaves a
/// half-applied change behind.
pub struct UsersTable<A> {
    api: A,
    records: Vec<User>,
    connection: Connection,
    saving: Arc<AtomicBool>,
    sort: Option<SortDirection>,
    page_index: usize,
    page_size: usize,
}

impl<A: UsersApi> UsersTable<A> {
    pub fn new(api: A) -> Self {
        Self::with_page_size(api, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(api: A, page_size: usize) -> Self {
        Self {
            api,
            records: Vec::new(),
            connection: Connection::Loading,
            saving: Arc::new(AtomicBool::new(false)),
            sort: None,
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn records(&self) -> &[User] {
        &self.records
    }

    pub fn connection(&self) -> Connection {
        self.connection
    }

    pub fn is_loading(&self) -> bool {
        self.connection == Connection::Loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(AtomicOrdering::SeqCst)
    }

    /// Shared view of the saving flag. A create or update holds `&mut self`
    /// across its await, so a spinner or dialog watches this handle instead.
    pub fn saving_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.saving)
    }

    /// Whether the new/edit/delete controls should be enabled.
    pub fn mutations_enabled(&self) -> bool {
        self.connection != Connection::Disconnected
    }

    /// The retry affordance is only offered after a failed load.
    pub fn can_retry(&self) -> bool {
        self.connection == Connection::Disconnected
    }

    /// Fetches the full collection. Never fails: errors flip the table to
    /// [`Connection::Disconnected`] with no records.
    pub async fn load(&mut self) -> Connection {
        self.connection = Connection::Loading;
        match self.api.list().await {
            Ok(users) => {
                info!(count = users.len(), "usuarios loaded");
                self.records = users;
                self.page_index = 0;
                self.connection = Connection::Connected;
            }
            Err(e) => {
                warn!(error = %e, "loading usuarios failed");
                self.records.clear();
                self.page_index = 0;
                self.connection = Connection::Disconnected;
            }
        }
        self.connection
    }

    pub async fn retry(&mut self) -> Connection {
        info!("retrying usuarios load");
        self.load().await
    }

    pub async fn create(&mut self, user: NewUser) -> Result<User, ActionError> {
        self.ensure_connected()?;
        self.saving.store(true, AtomicOrdering::SeqCst);
        let result = self.api.create(&user).await;
        self.saving.store(false, AtomicOrdering::SeqCst);

        let created = result.map_err(|e| {
            error!(error = %e, "creating usuario failed");
            ActionError::Create(e)
        })?;
        self.records.push(created.clone());
        Ok(created)
    }

    pub async fn update(&mut self, user: User) -> Result<(), ActionError> {
        self.ensure_connected()?;
        self.saving.store(true, AtomicOrdering::SeqCst);
        let result = self.api.update(&user).await;
        self.saving.store(false, AtomicOrdering::SeqCst);

        let updated = result.map_err(|e| {
            error!(error = %e, id = %user.id, "updating usuario failed");
            ActionError::Update(e)
        })?;
        if let Some(slot) = self.records.iter_mut().find(|u| u.id == updated.id) {
            *slot = updated;
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ActionError> {
        self.ensure_connected()?;
        self.api.delete(id).await.map_err(|e| {
            error!(error = %e, %id, "deleting usuario failed");
            ActionError::Delete(e)
        })?;
        self.records.retain(|u| u.id != id);
        self.clamp_page();
        Ok(())
    }

    fn ensure_connected(&self) -> Result<(), ActionError> {
        if self.connection == Connection::Disconnected {
            warn!("action blocked while disconnected");
            return Err(ActionError::Disconnected);
        }
        Ok(())
    }

    pub fn sort(&self) -> Option<SortDirection> {
        self.sort
    }

    /// Header click on the `nombre` column: ascending unless already
    /// ascending, in which case descending.
    pub fn toggle_nombre_sort(&mut self) {
        self.sort = match self.sort {
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            _ => Some(SortDirection::Asc),
        };
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    fn sorted(&self) -> Vec<&User> {
        let mut rows: Vec<&User> = self.records.iter().collect();
        if let Some(dir) = self.sort {
            // stable: equal names keep insertion order
            rows.sort_by(|a, b| {
                let ord = compare_nombre(a, b);
                match dir {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        rows
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_count(&self) -> usize {
        self.records.len().div_ceil(self.page_size).max(1)
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.page_index += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.can_previous_page() {
            self.page_index -= 1;
        }
    }

    fn clamp_page(&mut self) {
        self.page_index = self.page_index.min(self.page_count() - 1);
    }

    /// Rows of the current page, in display order.
    pub fn visible_rows(&self) -> Vec<&User> {
        self.sorted()
            .into_iter()
            .skip(self.page_index * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            shown: self.visible_rows().len(),
            total: self.records.len(),
            connected: self.connection != Connection::Disconnected,
        }
    }
}

fn compare_nombre(a: &User, b: &User) -> Ordering {
    a.nombre.to_lowercase().cmp(&b.nombre.to_lowercase())
}
