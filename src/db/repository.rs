//! Repository for CRUD operations over the JSON documents.
//!
//! Every mutation is a read-modify-write of a whole document. A failed
//! mutation writes nothing. Disk I/O runs on the blocking thread pool.

use std::sync::Arc;

use tokio::sync::Mutex;

use super::{Document, JsonStore, Stored};
use crate::errors::AppError;
use crate::models::{
    ClubInfo, ContactInfo, CreateEventRequest, CreateGalleryItemRequest, CreateMemberRequest,
    DashboardStats, Event, GalleryItem, Member, SiteData, UpdateClubInfoRequest,
    UpdateContactInfoRequest, UpdateEventRequest, UpdateGalleryItemRequest, UpdateMemberRequest,
};
use crate::uploads::UploadStore;

/// Repository over the club's JSON documents.
pub struct Repository {
    store: JsonStore,
    uploads: Arc<UploadStore>,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl Repository {
    pub fn new(store: JsonStore, uploads: Arc<UploadStore>) -> Self {
        Self {
            store,
            uploads,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&JsonStore, &UploadStore) -> Result<T, AppError> + Send + 'static,
    {
        let store = self.store.clone();
        let uploads = self.uploads.clone();
        tokio::task::spawn_blocking(move || f(&store, &uploads))
            .await
            .map_err(|e| {
                tracing::error!("Store task failed: {}", e);
                AppError::Internal(format!("Store task failed: {}", e))
            })?
    }

    async fn load<D: Stored + Send + 'static>(&self, doc: Document) -> Result<D, AppError> {
        self.blocking(move |store, _| store.load(doc)).await
    }

    /// Load `doc`, let `f` change it, and save only if `f` succeeded.
    async fn modify<D, R, F>(&self, doc: Document, f: F) -> Result<R, AppError>
    where
        D: Stored + Send + 'static,
        F: FnOnce(&mut D) -> Result<R, AppError>,
    {
        self.modify_releasing(doc, |contents| Ok((f(contents)?, None)))
            .await
    }

    /// Like [`Self::modify`], where `f` may also hand back an image path it
    /// stopped referencing. That file is deleted after the save, still under
    /// the write lock, unless another record uses it.
    async fn modify_releasing<D, R, F>(&self, doc: Document, f: F) -> Result<R, AppError>
    where
        D: Stored + Send + 'static,
        F: FnOnce(&mut D) -> Result<(R, Option<String>), AppError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut contents: D = self.load(doc).await?;
        let (result, released) = f(&mut contents)?;
        self.blocking(move |store, uploads| {
            store.save(doc, &contents)?;
            if let Some(path) = released {
                release_image(store, uploads, &path);
            }
            Ok(())
        })
        .await?;
        Ok(result)
    }

    /// Counts for the admin dashboard.
    pub async fn dashboard(&self) -> Result<DashboardStats, AppError> {
        Ok(DashboardStats {
            events_count: self.list_events().await?.len(),
            members_count: self.list_members().await?.len(),
            gallery_count: self.list_gallery().await?.len(),
        })
    }

    /// Everything the public site renders.
    pub async fn site_data(&self) -> Result<SiteData, AppError> {
        Ok(SiteData {
            club: self.get_club_info().await?,
            contact: self.get_contact_info().await?,
            events: self.list_events().await?,
            members: self.list_members().await?,
            gallery: self.list_gallery().await?,
        })
    }

    // ==================== EVENT OPERATIONS ====================

    /// List all events in collection order.
    pub async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        self.load(Document::Events).await
    }

    /// Get an event by id.
    pub async fn get_event(&self, id: u64) -> Result<Event, AppError> {
        self.list_events()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| event_not_found(id))
    }

    /// Create an event with id one above the current maximum (1 for an empty collection).
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event, AppError> {
        let event = self
            .modify(Document::Events, |events: &mut Vec<Event>| {
                let id = next_event_id(events)?;
                let event = request.into_event(id);
                ensure_complete(event.missing_fields())?;
                events.push(event.clone());
                Ok(event)
            })
            .await?;

        tracing::info!(event_id = event.id, name = %event.name, "Created event");
        Ok(event)
    }

    /// Merge the supplied fields into an event. The id is preserved.
    pub async fn update_event(
        &self,
        id: u64,
        request: &UpdateEventRequest,
    ) -> Result<Event, AppError> {
        let event = self
            .modify_releasing(Document::Events, |events: &mut Vec<Event>| {
                let slot = events
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| event_not_found(id))?;
                let mut updated = slot.clone();
                request.apply(&mut updated);
                ensure_complete(updated.missing_fields())?;
                let previous = std::mem::replace(slot, updated.clone());
                Ok((updated, replaced_image(previous.image, &slot.image)))
            })
            .await?;

        tracing::info!(event_id = id, "Updated event");
        Ok(event)
    }

    /// Remove an event, returning it.
    pub async fn delete_event(&self, id: u64) -> Result<Event, AppError> {
        let removed = self
            .modify_releasing(Document::Events, |events: &mut Vec<Event>| {
                let pos = events
                    .iter()
                    .position(|e| e.id == id)
                    .ok_or_else(|| event_not_found(id))?;
                let removed = events.remove(pos);
                let image = removed.image.clone();
                Ok((removed, Some(image)))
            })
            .await?;

        tracing::info!(event_id = id, "Deleted event");
        Ok(removed)
    }

    /// Flip whether an event shows on public pages; returns the new value.
    pub async fn toggle_event_visibility(&self, id: u64) -> Result<bool, AppError> {
        let shown = self
            .modify(Document::Events, |events: &mut Vec<Event>| {
                let event = events
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| event_not_found(id))?;
                event.show_in_events = !event.show_in_events;
                Ok(event.show_in_events)
            })
            .await?;

        tracing::info!(event_id = id, show_in_events = shown, "Toggled event visibility");
        Ok(shown)
    }

    /// Blank an event's image, returning the previous path.
    pub async fn clear_event_image(&self, id: u64) -> Result<String, AppError> {
        let previous = self
            .modify_releasing(Document::Events, |events: &mut Vec<Event>| {
                let event = events
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| event_not_found(id))?;
                if event.image.trim().is_empty() {
                    return Err(AppError::validation("No image to delete"));
                }
                let previous = std::mem::take(&mut event.image);
                Ok((previous.clone(), Some(previous)))
            })
            .await?;

        tracing::info!(event_id = id, image = %previous, "Cleared event image");
        Ok(previous)
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List all members in collection order.
    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        self.load(Document::Members).await
    }

    /// Get a member by zero-based position.
    pub async fn get_member(&self, index: usize) -> Result<Member, AppError> {
        self.list_members()
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| member_not_found(index))
    }

    /// Append a member.
    pub async fn create_member(&self, request: CreateMemberRequest) -> Result<Member, AppError> {
        let member = request.into_member();
        ensure_complete(member.missing_fields())?;

        let index = self
            .modify(Document::Members, |members: &mut Vec<Member>| {
                members.push(member.clone());
                Ok(members.len() - 1)
            })
            .await?;

        tracing::info!(index, name = %member.name, "Added member");
        Ok(member)
    }

    /// Merge the supplied fields into the member at `index`.
    pub async fn update_member(
        &self,
        index: usize,
        request: &UpdateMemberRequest,
    ) -> Result<Member, AppError> {
        let member = self
            .modify_releasing(Document::Members, |members: &mut Vec<Member>| {
                let slot = members
                    .get_mut(index)
                    .ok_or_else(|| member_not_found(index))?;
                let mut updated = slot.clone();
                request.apply(&mut updated);
                ensure_complete(updated.missing_fields())?;
                let previous = std::mem::replace(slot, updated.clone());
                Ok((updated, replaced_image(previous.image, &slot.image)))
            })
            .await?;

        tracing::info!(index, "Updated member");
        Ok(member)
    }

    /// Remove the member at `index`; later members shift down by one.
    pub async fn delete_member(&self, index: usize) -> Result<Member, AppError> {
        let removed = self
            .modify_releasing(Document::Members, |members: &mut Vec<Member>| {
                if index >= members.len() {
                    return Err(member_not_found(index));
                }
                let removed = members.remove(index);
                let image = removed.image.clone();
                Ok((removed, Some(image)))
            })
            .await?;

        tracing::info!(index, name = %removed.name, "Deleted member");
        Ok(removed)
    }

    // ==================== GALLERY OPERATIONS ====================

    /// List all gallery items in collection order.
    pub async fn list_gallery(&self) -> Result<Vec<GalleryItem>, AppError> {
        self.load(Document::Gallery).await
    }

    /// Get a gallery item by zero-based position.
    pub async fn get_gallery_item(&self, index: usize) -> Result<GalleryItem, AppError> {
        self.list_gallery()
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| gallery_not_found(index))
    }

    /// Append a gallery item.
    pub async fn create_gallery_item(
        &self,
        request: CreateGalleryItemRequest,
    ) -> Result<GalleryItem, AppError> {
        let item = request.into_item();
        ensure_complete(item.missing_fields())?;

        let index = self
            .modify(Document::Gallery, |gallery: &mut Vec<GalleryItem>| {
                gallery.push(item.clone());
                Ok(gallery.len() - 1)
            })
            .await?;

        tracing::info!(index, title = %item.title, "Added gallery item");
        Ok(item)
    }

    /// Merge the supplied fields into the gallery item at `index`.
    pub async fn update_gallery_item(
        &self,
        index: usize,
        request: &UpdateGalleryItemRequest,
    ) -> Result<GalleryItem, AppError> {
        let item = self
            .modify_releasing(Document::Gallery, |gallery: &mut Vec<GalleryItem>| {
                let slot = gallery
                    .get_mut(index)
                    .ok_or_else(|| gallery_not_found(index))?;
                let mut updated = slot.clone();
                request.apply(&mut updated);
                ensure_complete(updated.missing_fields())?;
                let previous = std::mem::replace(slot, updated.clone());
                Ok((updated, replaced_image(previous.image, &slot.image)))
            })
            .await?;

        tracing::info!(index, "Updated gallery item");
        Ok(item)
    }

    /// Remove the gallery item at `index`; later items shift down by one.
    pub async fn delete_gallery_item(&self, index: usize) -> Result<GalleryItem, AppError> {
        let removed = self
            .modify_releasing(Document::Gallery, |gallery: &mut Vec<GalleryItem>| {
                if index >= gallery.len() {
                    return Err(gallery_not_found(index));
                }
                let removed = gallery.remove(index);
                let image = removed.image.clone();
                Ok((removed, Some(image)))
            })
            .await?;

        tracing::info!(index, title = %removed.title, "Deleted gallery item");
        Ok(removed)
    }

    // ==================== SINGLETONS ====================

    pub async fn get_club_info(&self) -> Result<ClubInfo, AppError> {
        self.load(Document::ClubInfo).await
    }

    /// Overwrite the supplied club info fields.
    pub async fn replace_club_info(
        &self,
        request: &UpdateClubInfoRequest,
    ) -> Result<ClubInfo, AppError> {
        let info = self
            .modify_releasing(Document::ClubInfo, |info: &mut ClubInfo| {
                let previous = info.logo.clone();
                request.apply(info);
                Ok((info.clone(), replaced_image(previous, &info.logo)))
            })
            .await?;

        tracing::info!("Updated club info");
        Ok(info)
    }

    pub async fn get_contact_info(&self) -> Result<ContactInfo, AppError> {
        self.load(Document::ContactInfo).await
    }

    /// Overwrite the supplied contact fields.
    pub async fn replace_contact_info(
        &self,
        request: &UpdateContactInfoRequest,
    ) -> Result<ContactInfo, AppError> {
        let contact = self
            .modify(Document::ContactInfo, |contact: &mut ContactInfo| {
                request.apply(contact);
                Ok(contact.clone())
            })
            .await?;

        tracing::info!("Updated contact info");
        Ok(contact)
    }
}

fn next_event_id(events: &[Event]) -> Result<u64, AppError> {
    match events.iter().map(|e| e.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            AppError::StoreCorrupt(format!("Event id {} leaves no room for a new event", max))
        }),
    }
}

fn replaced_image(previous: String, current: &str) -> Option<String> {
    (previous != current).then_some(previous)
}

/// Delete an uploaded image unless an event, member, gallery item or the club
/// logo still refers to it.
fn release_image(store: &JsonStore, uploads: &UploadStore, path: &str) {
    if path.trim().is_empty() {
        return;
    }
    match image_in_use(store, path) {
        Ok(false) => uploads.remove(path),
        Ok(true) => tracing::debug!(image = path, "Image still referenced, keeping it"),
        Err(e) => {
            tracing::warn!(image = path, error = %e, "Could not check image references, keeping it")
        }
    }
}

fn image_in_use(store: &JsonStore, path: &str) -> Result<bool, AppError> {
    let club: ClubInfo = store.load(Document::ClubInfo)?;
    let events: Vec<Event> = store.load(Document::Events)?;
    let members: Vec<Member> = store.load(Document::Members)?;
    let gallery: Vec<GalleryItem> = store.load(Document::Gallery)?;

    Ok(club.logo == path
        || events.iter().any(|e| e.image == path)
        || members.iter().any(|m| m.image == path)
        || gallery.iter().any(|g| g.image == path))
}

fn ensure_complete(missing: Vec<String>) -> Result<(), AppError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::missing_fields(missing))
    }
}

fn event_not_found(id: u64) -> AppError {
    AppError::NotFound(format!("Event {} not found", id))
}

fn member_not_found(index: usize) -> AppError {
    AppError::NotFound(format!("Member {} not found", index))
}

fn gallery_not_found(index: usize) -> AppError {
    AppError::NotFound(format!("Gallery image {} not found", index))
}
