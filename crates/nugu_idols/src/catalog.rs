//! In-memory idol registry backed by the document store.
//!
//! The catalog holds every idol in store insertion order behind a single
//! RwLock. Mutations update memory first, then write through to the store
//! outside the lock, then refresh the cached snapshot. A failed store write
//! is logged and returned without rolling memory back; the next
//! [`IdolCatalog::load_all`] reconciles.

use derive_getters::Getters;
use nugu_core::{Gender, Idol, IdolId, IdolImage, IdolStats, Suggestion, alphanumeric_compare};
use nugu_error::{InconsistentStateError, NotFoundError, NotFoundErrorKind, NuguResult};
use nugu_imaging::ImageHasher;
use nugu_interface::{GameResultStore, IdolStore, ObjectStorage, SnapshotCache};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Cache key of the full idol snapshot.
pub const ALL_IDOLS_CACHE_KEY: &str = "allidols";

/// Catalog configuration.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct CatalogConfig {
    /// Lifetime of the cached snapshot in days
    #[serde(default = "default_cache_ttl_days")]
    cache_ttl_days: u64,

    /// Canonical group name to alternative spellings
    #[serde(default)]
    group_aliases: BTreeMap<String, Vec<String>>,
}

fn default_cache_ttl_days() -> u64 {
    7
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_ttl_days: default_cache_ttl_days(),
            group_aliases: BTreeMap::new(),
        }
    }
}

impl CatalogConfig {
    fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_days * 24 * 60 * 60)
    }
}

/// Result of a loose group and name lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdolMatch {
    /// A group matched
    pub group_found: bool,
    /// An idol in that group matched by name or alias
    pub name_found: bool,
    /// The matched idol
    pub idol: Option<Idol>,
}

/// An image close to a given hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarImage {
    /// Owning idol
    pub idol_id: IdolId,
    /// Owning idol's group
    pub group_name: String,
    /// Owning idol's name
    pub name: String,
    /// The image
    pub image: IdolImage,
    /// Hash distance, lower is closer
    pub distance: u32,
}

/// Counts and listing of the active idols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    /// Active idols
    pub total: usize,
    /// Active female idols
    pub girls: usize,
    /// Active male idols
    pub boys: usize,
    /// Groups first seen with a female idol
    pub girl_groups: usize,
    /// Groups first seen with a male idol
    pub boy_groups: usize,
    /// Group name and its idols, groups sorted case-insensitively.
    /// Idols with more than one image show the count, e.g. `Irene (3)`.
    pub groups: Vec<(String, Vec<String>)>,
}

#[derive(Debug, Default)]
struct CatalogState {
    idols: Vec<Idol>,
}

/// Where a moved image landed in memory.
enum Placement {
    Existing(IdolId),
    Created(Idol),
}

/// Idol registry.
///
/// Cloned snapshots are handed out; callers never hold references into the
/// lock.
pub struct IdolCatalog {
    store: Arc<dyn IdolStore>,
    games: Arc<dyn GameResultStore>,
    cache: Arc<dyn SnapshotCache>,
    objects: Arc<dyn ObjectStorage>,
    hasher: Arc<dyn ImageHasher>,
    config: CatalogConfig,
    state: RwLock<CatalogState>,
}

impl std::fmt::Debug for IdolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdolCatalog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IdolCatalog {
    /// Create an empty catalog. Call [`load_all`](Self::load_all) to fill it.
    pub fn new(
        store: Arc<dyn IdolStore>,
        games: Arc<dyn GameResultStore>,
        cache: Arc<dyn SnapshotCache>,
        objects: Arc<dyn ObjectStorage>,
        hasher: Arc<dyn ImageHasher>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            store,
            games,
            cache,
            objects,
            hasher,
            config,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Catalog configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Load every idol, from the cached snapshot unless `skip_cache` is set.
    ///
    /// Returns the number of idols loaded.
    ///
    /// # Errors
    ///
    /// Returns a not-found error and keeps the previous set when the store
    /// holds no idols.
    #[instrument(skip(self))]
    pub async fn load_all(&self, skip_cache: bool) -> NuguResult<usize> {
        if !skip_cache {
            match self.load_snapshot().await {
                Some(idols) => {
                    let count = idols.len();
                    self.state.write().await.idols = idols;
                    info!(count, "Idols loaded from cache");
                    return Ok(count);
                }
                None => info!("Idols loading from store, cache not set or expired"),
            }
        }

        let idols = self.store.list_idols().await?;
        if idols.is_empty() {
            error!("Refreshing idols failed, the idol store is empty");
            Err(NotFoundError::new(NotFoundErrorKind::NoRecords(
                "idols".to_string(),
            )))?
        }

        let count = idols.len();
        self.state.write().await.idols = idols;
        info!(count, "Idols loaded from store");
        self.refresh_cache().await;
        Ok(count)
    }

    async fn load_snapshot(&self) -> Option<Vec<Idol>> {
        let bytes = match self.cache.get(ALL_IDOLS_CACHE_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read idol snapshot");
                return None;
            }
        };
        match serde_json::from_slice::<Vec<Idol>>(&bytes) {
            Ok(idols) if !idols.is_empty() => Some(idols),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable idol snapshot");
                None
            }
        }
    }

    /// Write the current set to the cache. An empty set is never cached.
    async fn refresh_cache(&self) {
        let snapshot = {
            let state = self.state.read().await;
            if state.idols.is_empty() {
                return;
            }
            serde_json::to_vec(&state.idols)
        };
        let bytes = match snapshot {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize idol snapshot");
                return;
            }
        };
        if let Err(e) = self
            .cache
            .set(ALL_IDOLS_CACHE_KEY, bytes, self.config.cache_ttl())
            .await
        {
            warn!(error = %e, "Failed to write idol snapshot");
        }
    }

    /// Every idol, including deleted ones.
    pub async fn all(&self) -> Vec<Idol> {
        self.state.read().await.idols.clone()
    }

    /// Idols that are not deleted and have at least one image.
    pub async fn active(&self) -> Vec<Idol> {
        self.state
            .read()
            .await
            .idols
            .iter()
            .filter(|i| i.is_active())
            .cloned()
            .collect()
    }

    /// Idol by id.
    pub async fn find_by_id(&self, id: &IdolId) -> Option<Idol> {
        self.state
            .read()
            .await
            .idols
            .iter()
            .find(|i| &i.id == id)
            .cloned()
    }

    /// Canonical group name loosely matching `group`.
    ///
    /// Groups are compared directly first, then through the configured
    /// aliases. Iteration is over sorted distinct group names so the result
    /// is deterministic.
    pub async fn match_group(&self, group: &str, active_only: bool) -> Option<String> {
        let state = self.state.read().await;
        self.find_group(&state.idols, group, active_only)
    }

    /// Loosely match a group, then an idol in it by name or alias.
    ///
    /// The first idol in store order wins.
    pub async fn match_group_and_name(
        &self,
        group: &str,
        name: &str,
        active_only: bool,
    ) -> IdolMatch {
        let state = self.state.read().await;
        let Some(canonical) = self.find_group(&state.idols, group, active_only) else {
            return IdolMatch::default();
        };

        let idol = state
            .idols
            .iter()
            .filter(|i| !active_only || i.is_active())
            .filter(|i| i.group_name == canonical)
            .find(|i| {
                alphanumeric_compare(&i.name, name)
                    || i.name_aliases.iter().any(|a| alphanumeric_compare(a, name))
            })
            .cloned();

        IdolMatch {
            group_found: true,
            name_found: idol.is_some(),
            idol,
        }
    }

    fn find_group(&self, idols: &[Idol], search: &str, active_only: bool) -> Option<String> {
        let groups: BTreeSet<&str> = idols
            .iter()
            .filter(|i| !active_only || i.is_active())
            .map(|i| i.group_name.as_str())
            .collect();

        if let Some(group) = groups.iter().find(|g| alphanumeric_compare(g, search)) {
            return Some(group.to_string());
        }

        groups
            .iter()
            .find(|group| {
                self.config
                    .group_aliases
                    .iter()
                    .filter(|(canonical, _)| alphanumeric_compare(canonical, group))
                    .any(|(_, aliases)| aliases.iter().any(|a| alphanumeric_compare(a, search)))
            })
            .map(|g| g.to_string())
    }

    /// Rename an idol, or merge it into an existing one.
    ///
    /// Sources are idols whose group and name equal the target exactly. If
    /// another idol already carries exactly the new group and name, every
    /// source's images move to it, the sources are deleted and game history
    /// is rewritten to the destination id. Otherwise the sources are renamed
    /// in place.
    ///
    /// Returns the number of source idols found.
    #[instrument(skip(self))]
    pub async fn rename(
        &self,
        target_group: &str,
        target_name: &str,
        new_group: &str,
        new_name: &str,
        new_gender: Gender,
    ) -> NuguResult<usize> {
        // Loose match first, then insist on exact equality so a rename that
        // only changes spacing or case is not treated as a merge.
        let destination_id = self
            .match_group_and_name(new_group, new_name, false)
            .await
            .idol
            .filter(|d| d.group_name == new_group && d.name == new_name)
            .map(|d| d.id);

        let mut found = 0;
        let mut merged_sources = Vec::new();
        let mut renamed = Vec::new();
        let merged_destination = {
            let mut state = self.state.write().await;
            let destination_id =
                destination_id.filter(|id| state.idols.iter().any(|i| &i.id == id));
            let mut moved_images = Vec::new();

            state.idols.retain_mut(|idol| {
                if idol.group_name != target_group || idol.name != target_name {
                    return true;
                }
                found += 1;
                match &destination_id {
                    Some(id) if *id != idol.id => {
                        moved_images.append(&mut idol.images);
                        merged_sources.push(idol.id.clone());
                        false
                    }
                    _ => {
                        idol.group_name = new_group.to_string();
                        idol.name = new_name.to_string();
                        idol.gender = new_gender;
                        renamed.push(idol.clone());
                        true
                    }
                }
            });

            match destination_id {
                Some(id) if !merged_sources.is_empty() => state
                    .idols
                    .iter_mut()
                    .find(|i| i.id == id)
                    .map(|destination| {
                        destination.images.append(&mut moved_images);
                        destination.clone()
                    }),
                _ => None,
            }
        };

        if found == 0 {
            debug!("No idol matched the rename target");
            return Ok(0);
        }

        let persisted: NuguResult<()> = async {
            if let Some(destination) = &merged_destination {
                self.store.upsert_idol(destination).await?;
                for source in &merged_sources {
                    self.rewrite_game_references(source, &destination.id)
                        .await?;
                    self.store.delete_idol(source).await?;
                }
            }
            for idol in &renamed {
                self.store.upsert_idol(idol).await?;
            }
            Ok(())
        }
        .await;
        self.finish_mutation("rename", persisted).await?;

        info!(
            found,
            merged = merged_sources.len(),
            renamed = renamed.len(),
            "Idol rename complete"
        );
        Ok(found)
    }

    /// Rename every idol of a group. Returns the number of idols updated.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no active group matches `target_group`.
    #[instrument(skip(self))]
    pub async fn update_group(&self, target_group: &str, new_group: &str) -> NuguResult<usize> {
        let Some(canonical) = self.match_group(target_group, true).await else {
            return Err(NotFoundError::new(NotFoundErrorKind::Group(target_group.to_string())).into());
        };

        let members: Vec<(String, Gender)> = self
            .all()
            .await
            .into_iter()
            .filter(|i| i.group_name == canonical)
            .map(|i| (i.name, i.gender))
            .collect();

        let mut updated = 0;
        for (name, gender) in members {
            if self
                .rename(&canonical, &name, new_group, &name, gender)
                .await?
                > 0
            {
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Add an approved suggestion's image to the game.
    ///
    /// An idol with exactly the suggested group and name gets the image
    /// appended and is undeleted; otherwise a new idol is created. Adding an
    /// object the idol already holds only re-persists the idol, so a retried
    /// approval never stores the picture twice.
    #[instrument(skip(self, suggestion), fields(group = %suggestion.group_name, name = %suggestion.name))]
    pub async fn add_to_game(&self, suggestion: &Suggestion) -> NuguResult<Idol> {
        let image = IdolImage::new(&suggestion.object_name, &suggestion.image_hash);

        let idol = {
            let mut state = self.state.write().await;
            match state
                .idols
                .iter_mut()
                .find(|i| i.group_name == suggestion.group_name && i.name == suggestion.name)
            {
                Some(idol) => {
                    if idol.deleted {
                        // Drop the image kept loaded for running games.
                        idol.images.retain(|i| i.bytes.is_none());
                    }
                    if idol.image(&image.object_name).is_some() {
                        debug!(object_name = %image.object_name, "Image already in game");
                    } else {
                        idol.images.push(image);
                    }
                    idol.deleted = false;
                    idol.clone()
                }
                None => {
                    let mut idol = Idol::new(
                        &suggestion.name,
                        &suggestion.group_name,
                        suggestion.gender,
                    );
                    idol.images.push(image);
                    state.idols.push(idol.clone());
                    idol
                }
            }
        };

        let persisted = self.store.upsert_idol(&idol).await;
        self.finish_mutation("add_to_game", persisted).await?;

        info!(idol_id = %idol.id, images = idol.images.len(), "Added image to game");
        Ok(idol)
    }

    /// Remove an image from its idol and from object storage.
    ///
    /// Removing the last image soft-deletes the idol instead; the image's
    /// bytes stay loaded so running games can still show it.
    #[instrument(skip(self))]
    pub async fn delete_image(&self, object_name: &str) -> NuguResult<()> {
        let owner = self
            .owner_of(object_name)
            .await
            .ok_or_else(|| NotFoundError::new(NotFoundErrorKind::Image(object_name.to_string())))?;

        let last_image_bytes = if owner.images.len() == 1 {
            match self.objects.get(object_name).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    warn!(error = %e, "Could not load bytes of the last image");
                    None
                }
            }
        } else {
            None
        };

        {
            let mut state = self.state.write().await;
            let idol = state
                .idols
                .iter_mut()
                .find(|i| i.id == owner.id)
                .ok_or_else(|| {
                    NotFoundError::new(NotFoundErrorKind::Image(object_name.to_string()))
                })?;
            let position = idol
                .images
                .iter()
                .position(|i| i.object_name == object_name)
                .ok_or_else(|| {
                    NotFoundError::new(NotFoundErrorKind::Image(object_name.to_string()))
                })?;
            if idol.images.len() == 1 {
                idol.images[position].bytes = last_image_bytes;
                idol.deleted = true;
            } else {
                idol.images.remove(position);
            }
        }

        let persisted: NuguResult<()> = async {
            let mut record = self.stored_record(&owner.id).await?;
            Self::take_image(&mut record, object_name)?;
            if record.images.is_empty() {
                // History still references the idol, so it is only flagged.
                record.deleted = true;
            }
            self.store.upsert_idol(&record).await?;
            self.objects.delete(object_name).await
        }
        .await;
        self.finish_mutation("delete_image", persisted).await?;

        info!(idol_id = %owner.id, "Deleted image");
        Ok(())
    }

    /// Move one image to another idol, creating that idol if needed.
    ///
    /// A source idol left without images is removed and its game history is
    /// rewritten to the destination.
    #[instrument(skip(self))]
    pub async fn update_image(
        &self,
        object_name: &str,
        new_group: &str,
        new_name: &str,
        new_gender: Gender,
    ) -> NuguResult<Idol> {
        let owner = self
            .owner_of(object_name)
            .await
            .ok_or_else(|| NotFoundError::new(NotFoundErrorKind::Image(object_name.to_string())))?;

        let matched = self.match_group_and_name(new_group, new_name, false).await;
        let destination = matched
            .idol
            .filter(|_| matched.group_found && matched.name_found);
        if destination.as_ref().is_some_and(|d| d.id == owner.id) {
            debug!("Image already belongs to the destination idol");
            return Ok(owner);
        }

        let (image, source_removed, placement) = {
            let mut state = self.state.write().await;
            let index = state
                .idols
                .iter()
                .position(|i| i.id == owner.id)
                .ok_or_else(|| {
                    NotFoundError::new(NotFoundErrorKind::Image(object_name.to_string()))
                })?;
            let image = Self::take_image(&mut state.idols[index], object_name)?;
            let source_removed = state.idols[index].images.is_empty();
            if source_removed {
                state.idols.remove(index);
            }

            // Another task may have created the destination since the lookup.
            let target = destination.as_ref().map(|d| d.id.clone()).or_else(|| {
                state
                    .idols
                    .iter()
                    .find(|i| i.group_name == new_group && i.name == new_name)
                    .map(|i| i.id.clone())
            });
            let slot = target.and_then(|id| state.idols.iter().position(|i| i.id == id));
            let placement = match slot {
                Some(position) => {
                    let idol = &mut state.idols[position];
                    idol.images.push(image.clone());
                    Placement::Existing(idol.id.clone())
                }
                None => {
                    let mut idol = Idol::new(new_name, new_group, new_gender);
                    idol.images.push(image.clone());
                    state.idols.push(idol.clone());
                    Placement::Created(idol)
                }
            };
            (image, source_removed, placement)
        };

        let mut stored_image = image;
        stored_image.bytes = None;

        let result: NuguResult<Idol> = async {
            let mut source = self.stored_record(&owner.id).await?;
            Self::take_image(&mut source, object_name)?;
            if source.images.is_empty() {
                self.store.delete_idol(&source.id).await?;
            } else {
                self.store.upsert_idol(&source).await?;
            }

            let destination = match placement {
                Placement::Existing(id) => {
                    let mut record = self.stored_record(&id).await?;
                    record.images.push(stored_image);
                    self.store.upsert_idol(&record).await?;
                    record
                }
                Placement::Created(idol) => {
                    self.store.upsert_idol(&idol).await?;
                    idol
                }
            };

            if source_removed {
                self.rewrite_game_references(&owner.id, &destination.id)
                    .await?;
            }
            Ok(destination)
        }
        .await;

        let destination = match result {
            Ok(destination) => destination,
            Err(e) => {
                error!(error = %e, "update_image failed after memory was updated");
                return Err(e);
            }
        };
        self.refresh_cache().await;

        info!(
            from = %owner.id,
            to = %destination.id,
            source_removed,
            "Moved image"
        );
        Ok(destination)
    }

    /// Counts and per-group listing of the active idols.
    pub async fn list_summary(&self) -> CatalogSummary {
        let active = self.active().await;
        let mut summary = CatalogSummary {
            total: active.len(),
            ..CatalogSummary::default()
        };

        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for idol in &active {
            match idol.gender {
                Gender::Girl => summary.girls += 1,
                Gender::Boy => summary.boys += 1,
            }
            if !groups.contains_key(&idol.group_name) {
                match idol.gender {
                    Gender::Girl => summary.girl_groups += 1,
                    Gender::Boy => summary.boy_groups += 1,
                }
            }
            let label = if idol.images.len() > 1 {
                format!("{} ({})", idol.name, idol.images.len())
            } else {
                idol.name.clone()
            };
            groups.entry(idol.group_name.clone()).or_default().push(label);
        }

        let mut groups: Vec<(String, Vec<String>)> = groups.into_iter().collect();
        for (_, idols) in &mut groups {
            idols.sort();
        }
        groups.sort_by_key(|(group, _)| group.to_lowercase());
        summary.groups = groups;
        summary
    }

    /// Images of the active idol matching `group` and `name`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no active idol matches.
    pub async fn images_for(&self, group: &str, name: &str) -> NuguResult<Vec<IdolImage>> {
        let matched = self.match_group_and_name(group, name, true).await;
        match matched.idol {
            Some(idol) if matched.group_found && matched.name_found => Ok(idol.images),
            _ => Err(NotFoundError::new(NotFoundErrorKind::Idol(format!(
                "{} {}",
                group, name
            ))))?,
        }
    }

    /// Active images within `max_distance` of `hash`, best match first.
    pub async fn similar_images(&self, hash: &str, max_distance: u32) -> Vec<SimilarImage> {
        let state = self.state.read().await;
        let mut similar = Vec::new();
        for idol in state.idols.iter().filter(|i| i.is_active()) {
            for image in &idol.images {
                let distance = match self.hasher.distance(hash, &image.hash_string) {
                    Ok(distance) => distance,
                    Err(e) => {
                        warn!(error = %e, object_name = %image.object_name, "Comparison error");
                        continue;
                    }
                };
                if distance <= max_distance {
                    similar.push(SimilarImage {
                        idol_id: idol.id.clone(),
                        group_name: idol.group_name.clone(),
                        name: idol.name.clone(),
                        image: image.clone(),
                        distance,
                    });
                }
            }
        }
        similar.sort_by_key(|s| s.distance);
        similar
    }

    /// Bytes of one randomly chosen image of `idol`.
    ///
    /// Falls back to bytes kept in memory when object storage fails.
    pub async fn random_image(&self, idol: &Idol) -> NuguResult<Vec<u8>> {
        let image = {
            let mut rng = rand::thread_rng();
            idol.images.choose(&mut rng).cloned()
        }
        .ok_or_else(|| NotFoundError::new(NotFoundErrorKind::Image(idol.name_and_group())))?;

        match self.objects.get(&image.object_name).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => match image.bytes {
                Some(bytes) => {
                    warn!(error = %e, object_name = %image.object_name, "Using in-memory image bytes");
                    Ok(bytes)
                }
                None => Err(e),
            },
        }
    }

    /// Recompute stats for idols in memory and persist the ones that changed.
    ///
    /// `compute` returns the new counters for an idol, or `None` to leave it
    /// untouched. Returns the number of idols updated.
    pub async fn update_stats<F>(&self, mut compute: F) -> NuguResult<usize>
    where
        F: FnMut(&Idol) -> Option<IdolStats>,
    {
        let changed: Vec<(IdolId, IdolStats)> = {
            let mut state = self.state.write().await;
            state
                .idols
                .iter_mut()
                .filter_map(|idol| {
                    let stats = compute(idol)?;
                    idol.stats = stats;
                    Some((idol.id.clone(), stats))
                })
                .collect()
        };

        let persisted: NuguResult<()> = async {
            for (id, stats) in &changed {
                let Some(mut record) = self.store.find_idol(id).await? else {
                    warn!(idol_id = %id, "Idol missing from store while saving stats");
                    continue;
                };
                record.stats = *stats;
                self.store.upsert_idol(&record).await?;
            }
            Ok(())
        }
        .await;
        self.finish_mutation("update_stats", persisted).await?;

        debug!(updated = changed.len(), "Updated idol stats");
        Ok(changed.len())
    }

    async fn owner_of(&self, object_name: &str) -> Option<Idol> {
        self.state
            .read()
            .await
            .idols
            .iter()
            .find(|i| i.image(object_name).is_some())
            .cloned()
    }

    async fn stored_record(&self, id: &IdolId) -> NuguResult<Idol> {
        match self.store.find_idol(id).await? {
            Some(record) => Ok(record),
            None => Err(InconsistentStateError::new(format!(
                "idol {} is in memory but not in the store, reload the catalog",
                id
            )))?,
        }
    }

    fn take_image(idol: &mut Idol, object_name: &str) -> NuguResult<IdolImage> {
        match idol.images.iter().position(|i| i.object_name == object_name) {
            Some(position) => Ok(idol.images.remove(position)),
            None => Err(InconsistentStateError::new(format!(
                "image {} is missing from idol {}, reload the catalog",
                object_name, idol.id
            )))?,
        }
    }

    /// Repeat the store's id rewrite until a pass changes nothing.
    async fn rewrite_game_references(&self, from: &IdolId, to: &IdolId) -> NuguResult<u64> {
        let mut total = 0;
        loop {
            let changed = self.games.replace_idol_id(from, to).await?;
            if changed == 0 {
                break;
            }
            total += changed;
        }
        debug!(from = %from, to = %to, total, "Rewrote game references");
        Ok(total)
    }

    async fn finish_mutation(&self, operation: &str, persisted: NuguResult<()>) -> NuguResult<()> {
        match persisted {
            Ok(()) => {
                self.refresh_cache().await;
                Ok(())
            }
            Err(e) => {
                error!(operation, error = %e, "Store write failed after memory was updated");
                Err(e)
            }
        }
    }
}
