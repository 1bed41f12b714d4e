use std::path::Path;

use anyhow::Result;
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::db::{DEFAULT_QUOTA_BYTES, Database};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    EXPORT_VERSION, ExportData, FoodEntry, FoodUpdate, ImportData, MealType, NewFoodEntry,
    NewNoteEntry, NewStudyEntry, NewWorkoutEntry, NoteEntry, NoteUpdate, Settings,
    StudyCategory, StudyEntry, StudyUpdate, WeightEntry, WeightInput, WorkoutEntry,
    WorkoutUpdate, format_date,
};

/// The independently persisted collections and their storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Foods,
    Workouts,
    Notes,
    Studies,
    Settings,
    FoodDatabase,
    Weights,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Foods,
        Collection::Workouts,
        Collection::Notes,
        Collection::Studies,
        Collection::Settings,
        Collection::FoodDatabase,
        Collection::Weights,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Collection::Foods => "fittracker_foods",
            Collection::Workouts => "fittracker_workouts",
            Collection::Notes => "fittracker_notes",
            Collection::Studies => "fittracker_studies",
            Collection::Settings => "fittracker_settings",
            Collection::FoodDatabase => "fittracker_food_database",
            Collection::Weights => "fittracker_weights",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Collection::Foods => "foods",
            Collection::Workouts => "workouts",
            Collection::Notes => "notes",
            Collection::Studies => "studies",
            Collection::Settings => "settings",
            Collection::FoodDatabase => "food database",
            Collection::Weights => "weights",
        }
    }
}

/// A dated record kept in an id-addressed collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;
    type New;
    type Update;

    fn create(id: String, created_at: String, new: Self::New) -> Self;
    fn apply(&mut self, update: Self::Update);
    fn id(&self) -> &str;
    fn date(&self) -> &str;
    fn touch(&mut self, updated_at: String);
}

impl Record for FoodEntry {
    const COLLECTION: Collection = Collection::Foods;
    type New = NewFoodEntry;
    type Update = FoodUpdate;

    fn create(id: String, created_at: String, new: NewFoodEntry) -> Self {
        Self {
            id,
            date: format_date(new.date),
            meal_type: new.meal_type,
            name: new.name,
            weight: new.weight,
            calories: new.calories,
            carbs: new.carbs,
            protein: new.protein,
            fat: new.fat,
            note: new.note,
            created_at,
            updated_at: None,
        }
    }

    fn apply(&mut self, update: FoodUpdate) {
        if let Some(date) = update.date {
            self.date = format_date(date);
        }
        if let Some(meal_type) = update.meal_type {
            self.meal_type = meal_type;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(calories) = update.calories {
            self.calories = calories;
        }
        if let Some(carbs) = update.carbs {
            self.carbs = carbs;
        }
        if let Some(protein) = update.protein {
            self.protein = protein;
        }
        if let Some(fat) = update.fat {
            self.fat = fat;
        }
        if let Some(note) = update.note {
            self.note = note;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn touch(&mut self, updated_at: String) {
        self.updated_at = Some(updated_at);
    }
}

impl Record for WorkoutEntry {
    const COLLECTION: Collection = Collection::Workouts;
    type New = NewWorkoutEntry;
    type Update = WorkoutUpdate;

    fn create(id: String, created_at: String, new: NewWorkoutEntry) -> Self {
        Self {
            id,
            date: format_date(new.date),
            workout_type: new.workout_type,
            start_time: new.start_time,
            duration: new.duration,
            calories: new.calories,
            distance: new.distance,
            avg_heart_rate: new.avg_heart_rate,
            note: new.note,
            source: new.source,
            created_at,
            updated_at: None,
        }
    }

    fn apply(&mut self, update: WorkoutUpdate) {
        if let Some(date) = update.date {
            self.date = format_date(date);
        }
        if let Some(workout_type) = update.workout_type {
            self.workout_type = workout_type;
        }
        if let Some(start_time) = update.start_time {
            self.start_time = start_time;
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(calories) = update.calories {
            self.calories = calories;
        }
        if let Some(distance) = update.distance {
            self.distance = distance;
        }
        if let Some(avg_heart_rate) = update.avg_heart_rate {
            self.avg_heart_rate = avg_heart_rate;
        }
        if let Some(note) = update.note {
            self.note = note;
        }
        if let Some(source) = update.source {
            self.source = source;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn touch(&mut self, updated_at: String) {
        self.updated_at = Some(updated_at);
    }
}

impl Record for NoteEntry {
    const COLLECTION: Collection = Collection::Notes;
    type New = NewNoteEntry;
    type Update = NoteUpdate;

    fn create(id: String, created_at: String, new: NewNoteEntry) -> Self {
        Self {
            id,
            date: format_date(new.date),
            title: new.title,
            content: new.content,
            created_at,
            updated_at: None,
        }
    }

    fn apply(&mut self, update: NoteUpdate) {
        if let Some(date) = update.date {
            self.date = format_date(date);
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn touch(&mut self, updated_at: String) {
        self.updated_at = Some(updated_at);
    }
}

impl Record for StudyEntry {
    const COLLECTION: Collection = Collection::Studies;
    type New = NewStudyEntry;
    type Update = StudyUpdate;

    fn create(id: String, created_at: String, new: NewStudyEntry) -> Self {
        Self {
            id,
            date: format_date(new.date),
            category: new.category,
            duration: new.duration,
            topic: new.topic,
            content: new.content,
            reflection: new.reflection,
            resources: new.resources,
            tasks: new.tasks,
            created_at,
            updated_at: None,
        }
    }

    fn apply(&mut self, update: StudyUpdate) {
        if let Some(date) = update.date {
            self.date = format_date(date);
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
        if let Some(topic) = update.topic {
            self.topic = topic;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(reflection) = update.reflection {
            self.reflection = reflection;
        }
        if let Some(resources) = update.resources {
            self.resources = resources;
        }
        if let Some(tasks) = update.tasks {
            self.tasks = tasks;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn touch(&mut self, updated_at: String) {
        self.updated_at = Some(updated_at);
    }
}

/// Time-ordered unique id: a UUIDv7 carries a millisecond timestamp and
/// random bits.
fn new_id() -> String {
    Uuid::now_v7().to_string()
}

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub quota_bytes: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

/// Sole reader and writer of every collection.
///
/// Public methods never fail: write problems come back as `false` or
/// `None`, unreadable data reads as empty, and the cause is logged.
pub struct Store {
    pub(crate) db: Database,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    pub fn open_with(path: &Path, options: StoreOptions) -> Result<Self> {
        let db = Database::open(path, options.quota_bytes)?;
        debug!(path = %path.display(), quota = options.quota_bytes, "Opened store");
        Ok(Self { db })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with(StoreOptions::default())
    }

    pub fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
        let db = Database::open_in_memory(options.quota_bytes)?;
        Ok(Self { db })
    }

    pub(crate) fn report(action: &str, collection: Collection, err: &StoreError) {
        match err {
            StoreError::QuotaExceeded { .. } | StoreError::Corrupt { .. } => {
                warn!(collection = collection.name(), error = %err, "{action} failed");
            }
            StoreError::NotFound { .. } => {
                debug!(collection = collection.name(), error = %err, "{action} skipped");
            }
            StoreError::Sqlite(_) | StoreError::Serialization(_) => {
                error!(collection = collection.name(), error = %err, "{action} failed");
            }
        }
    }

    // --- Generic read/write ---

    pub(crate) fn try_read<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> StoreResult<Option<T>> {
        let Some(raw) = self.db.get(collection.key())? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: collection.key().to_string(),
                source,
            })
    }

    pub(crate) fn try_write<T: Serialize + ?Sized>(
        &self,
        collection: Collection,
        value: &T,
    ) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.db.set(collection.key(), &raw)
    }

    /// Every record in `collection`, in insertion order. Missing or
    /// unreadable data is an empty collection.
    #[must_use]
    pub fn get_collection<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        match self.try_read(collection) {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                Self::report("read", collection, &e);
                Vec::new()
            }
        }
    }

    /// Replace `collection` with `records`. Returns `false` if the write was
    /// rejected; the stored data is then unchanged.
    pub fn set_collection<T: Serialize>(&self, collection: Collection, records: &[T]) -> bool {
        match self.try_write(collection, records) {
            Ok(()) => true,
            Err(e) => {
                Self::report("write", collection, &e);
                false
            }
        }
    }

    // --- Generic record CRUD ---

    #[must_use]
    pub fn all<R: Record>(&self) -> Vec<R> {
        self.get_collection(R::COLLECTION)
    }

    #[must_use]
    pub fn get_by_id<R: Record>(&self, id: &str) -> Option<R> {
        self.all::<R>().into_iter().find(|r| r.id() == id)
    }

    #[must_use]
    pub fn get_by_date<R: Record>(&self, date: NaiveDate) -> Vec<R> {
        let date = format_date(date);
        self.all::<R>()
            .into_iter()
            .filter(|r| r.date() == date)
            .collect()
    }

    /// Records dated within `start..=end`. ISO dates order correctly as strings.
    #[must_use]
    pub fn get_by_date_range<R: Record>(&self, start: NaiveDate, end: NaiveDate) -> Vec<R> {
        let start = format_date(start);
        let end = format_date(end);
        self.all::<R>()
            .into_iter()
            .filter(|r| r.date() >= start.as_str() && r.date() <= end.as_str())
            .collect()
    }

    pub fn add<R: Record>(&self, new: R::New) -> Option<R> {
        let record = R::create(new_id(), timestamp(), new);
        let mut records: Vec<R> = self.all();
        records.push(record.clone());
        if self.set_collection(R::COLLECTION, &records) {
            debug!(collection = R::COLLECTION.name(), id = record.id(), "Added record");
            Some(record)
        } else {
            None
        }
    }

    /// Merge `update` into the record with `id`. Unknown ids return `None`
    /// and leave the collection untouched.
    pub fn update<R: Record>(&self, id: &str, update: R::Update) -> Option<R> {
        match self.try_update(id, update) {
            Ok(record) => Some(record),
            Err(e) => {
                Self::report("update", R::COLLECTION, &e);
                None
            }
        }
    }

    fn try_update<R: Record>(&self, id: &str, update: R::Update) -> StoreResult<R> {
        let mut records: Vec<R> = self.all();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: R::COLLECTION.name(),
                id: id.to_string(),
            })?;
        record.apply(update);
        record.touch(timestamp());
        let updated = record.clone();
        self.try_write(R::COLLECTION, &records)?;
        debug!(collection = R::COLLECTION.name(), id, "Updated record");
        Ok(updated)
    }

    /// Remove the record with `id`. Returns whether a record was removed;
    /// an unknown id is a no-op.
    pub fn delete<R: Record>(&self, id: &str) -> bool {
        self.try_delete::<R>(id).unwrap_or_else(|e| {
            Self::report("delete", R::COLLECTION, &e);
            false
        })
    }

    /// Like [`Store::delete`], but a rejected write is an error instead of
    /// `false`, so callers can tell it apart from an unknown id.
    pub fn try_delete<R: Record>(&self, id: &str) -> StoreResult<bool> {
        let mut records: Vec<R> = self.all();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            debug!(collection = R::COLLECTION.name(), id, "Delete skipped, no such record");
            return Ok(false);
        }
        self.try_write(R::COLLECTION, &records)?;
        Ok(true)
    }

    // --- Foods ---

    /// Log a food and teach the food database its per-100g values.
    pub fn add_food(&self, food: NewFoodEntry) -> Option<FoodEntry> {
        let entry = self.add::<FoodEntry>(food)?;
        self.learn_food(&entry);
        Some(entry)
    }

    pub fn update_food(&self, id: &str, update: FoodUpdate) -> Option<FoodEntry> {
        self.update::<FoodEntry>(id, update)
    }

    pub fn delete_food(&self, id: &str) -> bool {
        self.delete::<FoodEntry>(id)
    }

    #[must_use]
    pub fn foods(&self) -> Vec<FoodEntry> {
        self.all()
    }

    #[must_use]
    pub fn food_by_id(&self, id: &str) -> Option<FoodEntry> {
        self.get_by_id(id)
    }

    #[must_use]
    pub fn foods_by_date(&self, date: NaiveDate) -> Vec<FoodEntry> {
        self.get_by_date(date)
    }

    /// Foods on `date`, optionally narrowed to one meal.
    #[must_use]
    pub fn foods_by_date_and_meal(
        &self,
        date: NaiveDate,
        meal: Option<MealType>,
    ) -> Vec<FoodEntry> {
        self.foods_by_date(date)
            .into_iter()
            .filter(|f| meal.is_none_or(|m| f.meal_type == m))
            .collect()
    }

    #[must_use]
    pub fn foods_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<FoodEntry> {
        self.get_by_date_range(start, end)
    }

    // --- Workouts ---

    pub fn add_workout(&self, workout: NewWorkoutEntry) -> Option<WorkoutEntry> {
        self.add::<WorkoutEntry>(workout)
    }

    pub fn update_workout(&self, id: &str, update: WorkoutUpdate) -> Option<WorkoutEntry> {
        self.update::<WorkoutEntry>(id, update)
    }

    pub fn delete_workout(&self, id: &str) -> bool {
        self.delete::<WorkoutEntry>(id)
    }

    #[must_use]
    pub fn workouts(&self) -> Vec<WorkoutEntry> {
        self.all()
    }

    #[must_use]
    pub fn workouts_by_date(&self, date: NaiveDate) -> Vec<WorkoutEntry> {
        self.get_by_date(date)
    }

    #[must_use]
    pub fn workouts_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<WorkoutEntry> {
        self.get_by_date_range(start, end)
    }

    // --- Notes ---

    pub fn add_note(&self, note: NewNoteEntry) -> Option<NoteEntry> {
        self.add::<NoteEntry>(note)
    }

    pub fn update_note(&self, id: &str, update: NoteUpdate) -> Option<NoteEntry> {
        self.update::<NoteEntry>(id, update)
    }

    pub fn delete_note(&self, id: &str) -> bool {
        self.delete::<NoteEntry>(id)
    }

    #[must_use]
    pub fn notes(&self) -> Vec<NoteEntry> {
        self.all()
    }

    #[must_use]
    pub fn note_by_id(&self, id: &str) -> Option<NoteEntry> {
        self.get_by_id(id)
    }

    /// Case-insensitive keyword match against note titles and content.
    #[must_use]
    pub fn search_notes(&self, keyword: &str) -> Vec<NoteEntry> {
        let keyword = keyword.to_lowercase();
        self.notes()
            .into_iter()
            .filter(|n| {
                n.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&keyword))
                    || n.content.to_lowercase().contains(&keyword)
            })
            .collect()
    }

    // --- Studies ---

    pub fn add_study(&self, study: NewStudyEntry) -> Option<StudyEntry> {
        self.add::<StudyEntry>(study)
    }

    pub fn update_study(&self, id: &str, update: StudyUpdate) -> Option<StudyEntry> {
        self.update::<StudyEntry>(id, update)
    }

    pub fn delete_study(&self, id: &str) -> bool {
        self.delete::<StudyEntry>(id)
    }

    #[must_use]
    pub fn studies(&self) -> Vec<StudyEntry> {
        self.all()
    }

    #[must_use]
    pub fn study_by_id(&self, id: &str) -> Option<StudyEntry> {
        self.get_by_id(id)
    }

    #[must_use]
    pub fn studies_by_date(&self, date: NaiveDate) -> Vec<StudyEntry> {
        self.get_by_date(date)
    }

    #[must_use]
    pub fn studies_by_date_and_category(
        &self,
        date: NaiveDate,
        category: Option<StudyCategory>,
    ) -> Vec<StudyEntry> {
        self.studies_by_date(date)
            .into_iter()
            .filter(|s| category.is_none_or(|c| s.category == c))
            .collect()
    }

    #[must_use]
    pub fn studies_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<StudyEntry> {
        self.get_by_date_range(start, end)
    }

    // --- Weight ---

    /// Weight records, oldest first.
    #[must_use]
    pub fn weights(&self) -> Vec<WeightEntry> {
        self.get_collection(Collection::Weights)
    }

    #[must_use]
    pub fn get_weight(&self, date: NaiveDate) -> Option<WeightEntry> {
        let date = format_date(date);
        self.weights().into_iter().find(|w| w.date == date)
    }

    /// Upsert the record for `input.date`. Readings present in `input`
    /// replace stored ones; absent readings are kept.
    pub fn save_weight(&self, input: &WeightInput) -> Option<WeightEntry> {
        let date = format_date(input.date);
        let now = timestamp();
        let mut entries = self.weights();

        let saved = if let Some(existing) = entries.iter_mut().find(|w| w.date == date) {
            if input.morning_weight.is_some() {
                existing.morning_weight = input.morning_weight;
            }
            if input.evening_weight.is_some() {
                existing.evening_weight = input.evening_weight;
            }
            existing.updated_at = Some(now);
            existing.clone()
        } else {
            let entry = WeightEntry {
                date,
                morning_weight: input.morning_weight,
                evening_weight: input.evening_weight,
                updated_at: Some(now),
            };
            entries.push(entry.clone());
            entries.sort_by(|a, b| a.date.cmp(&b.date));
            entry
        };

        self.set_collection(Collection::Weights, &entries)
            .then_some(saved)
    }

    pub fn delete_weight(&self, date: NaiveDate) -> bool {
        self.try_delete_weight(date).unwrap_or_else(|e| {
            Self::report("delete", Collection::Weights, &e);
            false
        })
    }

    pub fn try_delete_weight(&self, date: NaiveDate) -> StoreResult<bool> {
        let date = format_date(date);
        let mut entries = self.weights();
        let before = entries.len();
        entries.retain(|w| w.date != date);
        if entries.len() == before {
            return Ok(false);
        }
        self.try_write(Collection::Weights, &entries)?;
        Ok(true)
    }

    // --- Settings ---

    /// Stored settings merged over the defaults. Unreadable settings read as
    /// the defaults.
    #[must_use]
    pub fn settings(&self) -> Settings {
        match self.try_read::<Settings>(Collection::Settings) {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                Self::report("read", Collection::Settings, &e);
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> bool {
        match self.try_write(Collection::Settings, settings) {
            Ok(()) => true,
            Err(e) => {
                Self::report("write", Collection::Settings, &e);
                false
            }
        }
    }

    // --- Import / export ---

    #[must_use]
    pub fn export_all(&self) -> ExportData {
        ExportData {
            version: EXPORT_VERSION,
            foods: self.foods(),
            workouts: self.workouts(),
            notes: self.notes(),
            studies: self.studies(),
            settings: self.settings(),
            food_database: self.food_database(),
            weights: self.weights(),
            exported_at: timestamp(),
        }
    }

    #[must_use]
    pub fn export_json(&self) -> Option<String> {
        match serde_json::to_string_pretty(&self.export_all()) {
            Ok(json) => Some(json),
            Err(e) => {
                error!(error = %e, "Export serialization failed");
                None
            }
        }
    }

    /// Overwrite every collection present in `data`; absent ones are left
    /// alone. All writes commit together or not at all.
    pub fn import_data(&self, data: &ImportData) -> bool {
        match self.db.transaction(|_| self.write_import(data)) {
            Ok(replaced) => {
                info!(collections = replaced, "Imported data");
                true
            }
            Err(e) => {
                warn!(error = %e, "Import failed");
                false
            }
        }
    }

    pub fn import_json(&self, json: &str) -> bool {
        match serde_json::from_str::<ImportData>(json) {
            Ok(data) => self.import_data(&data),
            Err(e) => {
                warn!(error = %e, "Import document is not valid");
                false
            }
        }
    }

    fn write_import(&self, data: &ImportData) -> StoreResult<usize> {
        let mut replaced = 0;
        if let Some(foods) = &data.foods {
            self.try_write(Collection::Foods, foods)?;
            replaced += 1;
        }
        if let Some(workouts) = &data.workouts {
            self.try_write(Collection::Workouts, workouts)?;
            replaced += 1;
        }
        if let Some(notes) = &data.notes {
            self.try_write(Collection::Notes, notes)?;
            replaced += 1;
        }
        if let Some(studies) = &data.studies {
            self.try_write(Collection::Studies, studies)?;
            replaced += 1;
        }
        if let Some(settings) = &data.settings {
            self.try_write(Collection::Settings, settings)?;
            replaced += 1;
        }
        if let Some(items) = &data.food_database {
            self.try_write(Collection::FoodDatabase, items)?;
            replaced += 1;
        }
        if let Some(weights) = &data.weights {
            let mut weights = weights.clone();
            weights.sort_by(|a, b| a.date.cmp(&b.date));
            self.try_write(Collection::Weights, &weights)?;
            replaced += 1;
        }
        Ok(replaced)
    }

    /// Remove every collection key. Returns `false` if any removal failed.
    pub fn clear_all(&self) -> bool {
        let mut ok = true;
        for collection in Collection::ALL {
            if let Err(e) = self.db.remove(collection.key()) {
                Self::report("clear", collection, &e);
                ok = false;
            }
        }
        if ok {
            info!("Cleared all collections");
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WorkoutSource, WorkoutType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_food(day: NaiveDate) -> NewFoodEntry {
        NewFoodEntry {
            date: day,
            meal_type: MealType::Lunch,
            name: "Chicken Breast".to_string(),
            weight: 200.0,
            calories: 330.0,
            carbs: 0.0,
            protein: 62.0,
            fat: 7.2,
            note: String::new(),
        }
    }

    fn sample_workout(day: NaiveDate) -> NewWorkoutEntry {
        NewWorkoutEntry {
            date: day,
            workout_type: WorkoutType::Running,
            start_time: "2024-06-15T07:30".to_string(),
            duration: 30,
            calories: 300.0,
            distance: 5.0,
            avg_heart_rate: 145,
            note: String::new(),
            source: WorkoutSource::Manual,
        }
    }

    fn sample_note(day: NaiveDate, title: &str, content: &str) -> NewNoteEntry {
        NewNoteEntry {
            date: day,
            title: Some(title.to_string()),
            content: content.to_string(),
        }
    }

    fn sample_study(day: NaiveDate, category: StudyCategory) -> NewStudyEntry {
        NewStudyEntry {
            date: day,
            category,
            duration: 45,
            topic: "Ownership".to_string(),
            content: "Borrow checker chapter".to_string(),
            reflection: None,
            resources: None,
            tasks: vec!["read".to_string(), "exercises".to_string()],
        }
    }

    #[test]
    fn test_collection_keys_are_distinct() {
        let mut keys: Vec<&str> = Collection::ALL.iter().map(|c| c.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Collection::ALL.len());
    }

    #[test]
    fn test_get_collection_missing_is_empty() {
        let store = Store::open_in_memory().unwrap();
        let foods: Vec<FoodEntry> = store.get_collection(Collection::Foods);
        assert!(foods.is_empty());
    }

    #[test]
    fn test_get_collection_corrupt_is_empty() {
        let store = Store::open_in_memory().unwrap();
        store.db.set(Collection::Foods.key(), "{not json").unwrap();
        assert!(store.foods().is_empty());

        let err = store.try_read::<Vec<FoodEntry>>(Collection::Foods).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_add_food_and_get_by_id() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let entry = store.add_food(sample_food(day)).unwrap();

        assert!(!entry.id.is_empty());
        assert!(!entry.created_at.is_empty());
        assert!(entry.updated_at.is_none());
        assert_eq!(entry.date, "2024-06-15");
        assert_eq!(entry.name, "Chicken Breast");

        assert_eq!(store.food_by_id(&entry.id), Some(entry.clone()));
        assert_eq!(store.foods_by_date(day), vec![entry]);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let ids: Vec<String> = (0..5)
            .map(|_| store.add_food(sample_food(day)).unwrap().id)
            .collect();

        let stored: Vec<String> = store.foods().into_iter().map(|f| f.id).collect();
        assert_eq!(stored, ids);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let mut ids: Vec<String> = (0..50)
            .map(|_| store.add_note(sample_note(day, "t", "c")).unwrap().id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let first = store.add_workout(sample_workout(day)).unwrap();
        assert!(store.delete_workout(&first.id));
        let second = store.add_workout(sample_workout(day)).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_update_food_merges_fields() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let entry = store.add_food(sample_food(day)).unwrap();
        store.add_food(sample_food(day)).unwrap();

        let updated = store
            .update_food(
                &entry.id,
                FoodUpdate {
                    meal_type: Some(MealType::Dinner),
                    calories: Some(400.0),
                    ..FoodUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.meal_type, MealType::Dinner);
        assert!((updated.calories - 400.0).abs() < f64::EPSILON);
        assert_eq!(updated.name, "Chicken Breast");
        assert_eq!(updated.created_at, entry.created_at);
        assert!(updated.updated_at.is_some());

        // Position preserved
        assert_eq!(store.foods()[0], updated);
    }

    #[test]
    fn test_update_not_found_leaves_collection_unchanged() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        store.add_food(sample_food(day)).unwrap();
        let before = store.foods();

        let result = store.update_food(
            "missing",
            FoodUpdate {
                name: Some("Ghost".to_string()),
                ..FoodUpdate::default()
            },
        );

        assert!(result.is_none());
        assert_eq!(store.foods(), before);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        store.add_food(sample_food(day)).unwrap();
        assert!(!store.delete_food("missing"));
        assert_eq!(store.foods().len(), 1);
    }

    #[test]
    fn test_delete_food() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let a = store.add_food(sample_food(day)).unwrap();
        let b = store.add_food(sample_food(day)).unwrap();

        assert!(store.delete_food(&a.id));
        assert_eq!(store.foods(), vec![b]);
        // Deleting again is a no-op
        assert!(!store.delete_food(&a.id));
    }

    #[test]
    fn test_foods_by_date_range_inclusive() {
        let store = Store::open_in_memory().unwrap();
        for day in 10..=20 {
            store.add_food(sample_food(date(2024, 6, day))).unwrap();
        }
        let range = store.foods_by_date_range(date(2024, 6, 12), date(2024, 6, 14));
        let dates: Vec<&str> = range.iter().map(|f| f.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-06-12", "2024-06-13", "2024-06-14"]);
    }

    #[test]
    fn test_foods_by_date_and_meal() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        store.add_food(sample_food(day)).unwrap();
        store
            .add_food(NewFoodEntry {
                meal_type: MealType::Breakfast,
                ..sample_food(day)
            })
            .unwrap();

        assert_eq!(store.foods_by_date_and_meal(day, None).len(), 2);
        let breakfast = store.foods_by_date_and_meal(day, Some(MealType::Breakfast));
        assert_eq!(breakfast.len(), 1);
        assert_eq!(breakfast[0].meal_type, MealType::Breakfast);
        assert!(store.foods_by_date_and_meal(day, Some(MealType::Snack)).is_empty());
    }

    #[test]
    fn test_workout_crud() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let w = store.add_workout(sample_workout(day)).unwrap();
        assert_eq!(store.workouts_by_date(day), vec![w.clone()]);

        let updated = store
            .update_workout(
                &w.id,
                WorkoutUpdate {
                    duration: Some(45),
                    workout_type: Some(WorkoutType::Cycling),
                    ..WorkoutUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.duration, 45);
        assert_eq!(updated.workout_type, WorkoutType::Cycling);
        assert_eq!(updated.avg_heart_rate, 145);

        assert!(store.delete_workout(&w.id));
        assert!(store.workouts().is_empty());
    }

    #[test]
    fn test_note_update_can_clear_title() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let note = store.add_note(sample_note(day, "Plan", "Deadlift day")).unwrap();

        let updated = store
            .update_note(
                &note.id,
                NoteUpdate {
                    title: Some(None),
                    ..NoteUpdate::default()
                },
            )
            .unwrap();
        assert!(updated.title.is_none());
        assert_eq!(updated.content, "Deadlift day");
        assert_eq!(store.note_by_id(&note.id), Some(updated));
    }

    #[test]
    fn test_search_notes_title_and_content() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        store.add_note(sample_note(day, "Squat PR", "felt strong")).unwrap();
        store.add_note(sample_note(day, "Recovery", "SQUAT mobility work")).unwrap();
        store.add_note(sample_note(day, "Diet", "more protein")).unwrap();
        store
            .add_note(NewNoteEntry {
                date: day,
                title: None,
                content: "untitled".to_string(),
            })
            .unwrap();

        assert_eq!(store.search_notes("squat").len(), 2);
        assert_eq!(store.search_notes("PROTEIN").len(), 1);
        assert_eq!(store.search_notes("untitled").len(), 1);
        assert!(store.search_notes("bench").is_empty());
    }

    #[test]
    fn test_study_crud_and_category_filter() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let s = store.add_study(sample_study(day, StudyCategory::Coding)).unwrap();
        store.add_study(sample_study(day, StudyCategory::Reading)).unwrap();

        assert_eq!(store.studies_by_date_and_category(day, None).len(), 2);
        let coding = store.studies_by_date_and_category(day, Some(StudyCategory::Coding));
        assert_eq!(coding, vec![s.clone()]);

        let updated = store
            .update_study(
                &s.id,
                StudyUpdate {
                    tasks: Some(vec!["done".to_string()]),
                    reflection: Some(Some("good".to_string())),
                    ..StudyUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.tasks, vec!["done".to_string()]);
        assert_eq!(updated.reflection.as_deref(), Some("good"));
        assert_eq!(store.study_by_id(&s.id), Some(updated));

        assert!(store.delete_study(&s.id));
        assert_eq!(store.studies().len(), 1);
    }

    #[test]
    fn test_weight_upsert_same_date() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2025, 1, 15);

        store
            .save_weight(&WeightInput {
                date: day,
                morning_weight: Some(80.5),
                evening_weight: None,
            })
            .unwrap();
        let saved = store
            .save_weight(&WeightInput {
                date: day,
                morning_weight: Some(79.8),
                evening_weight: Some(80.4),
            })
            .unwrap();

        assert_eq!(saved.morning_weight, Some(79.8));
        assert_eq!(saved.evening_weight, Some(80.4));
        let all = store.weights();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], saved);
    }

    #[test]
    fn test_weight_upsert_keeps_absent_reading() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2025, 1, 15);
        store
            .save_weight(&WeightInput {
                date: day,
                morning_weight: Some(80.5),
                evening_weight: None,
            })
            .unwrap();
        let saved = store
            .save_weight(&WeightInput {
                date: day,
                morning_weight: None,
                evening_weight: Some(81.0),
            })
            .unwrap();
        assert_eq!(saved.morning_weight, Some(80.5));
        assert_eq!(saved.evening_weight, Some(81.0));
    }

    #[test]
    fn test_weights_sorted_by_date() {
        let store = Store::open_in_memory().unwrap();
        for day in [12, 10, 11] {
            store
                .save_weight(&WeightInput {
                    date: date(2025, 1, day),
                    morning_weight: Some(80.0),
                    evening_weight: None,
                })
                .unwrap();
        }
        let dates: Vec<String> = store.weights().into_iter().map(|w| w.date).collect();
        assert_eq!(dates, vec!["2025-01-10", "2025-01-11", "2025-01-12"]);
    }

    #[test]
    fn test_delete_weight() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2025, 1, 15);
        store
            .save_weight(&WeightInput {
                date: day,
                morning_weight: Some(80.0),
                evening_weight: None,
            })
            .unwrap();
        assert!(store.get_weight(day).is_some());
        assert!(store.delete_weight(day));
        assert!(store.get_weight(day).is_none());
        assert!(!store.delete_weight(day));
    }

    #[test]
    fn test_settings_default_when_absent_or_corrupt() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.settings(), Settings::default());

        store.db.set(Collection::Settings.key(), "[1,2").unwrap();
        assert_eq!(store.settings(), Settings::default());
    }

    #[test]
    fn test_settings_partial_record_merges_defaults() {
        let store = Store::open_in_memory().unwrap();
        store
            .db
            .set(Collection::Settings.key(), r#"{"calorieGoal":1800}"#)
            .unwrap();
        let settings = store.settings();
        assert_eq!(settings.calorie_goal, 1800);
        assert_eq!(settings.nickname, "用户");
        assert_eq!(settings.fat_goal, 65);
    }

    #[test]
    fn test_save_settings() {
        let store = Store::open_in_memory().unwrap();
        let settings = Settings {
            nickname: "Ann".to_string(),
            height: Some(170.0),
            calorie_goal: 1800,
            ..Settings::default()
        };
        assert!(store.save_settings(&settings));
        assert_eq!(store.settings(), settings);
    }

    #[test]
    fn test_quota_exceeded_write_returns_false() {
        let store = Store::open_in_memory_with(StoreOptions { quota_bytes: 600 }).unwrap();
        let day = date(2024, 6, 15);
        assert!(store.add_food(sample_food(day)).is_some());
        let before = store.foods();

        let mut failed = false;
        for _ in 0..10 {
            if store.add_workout(sample_workout(day)).is_none() {
                failed = true;
                break;
            }
        }
        assert!(failed);
        assert_eq!(store.foods(), before);
        assert!(!store.set_collection(Collection::Notes, &["x".repeat(1000)]));
    }

    #[test]
    fn test_export_import_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        store.add_food(sample_food(day)).unwrap();
        store
            .add_food(NewFoodEntry {
                name: "Oatmeal".to_string(),
                ..sample_food(day)
            })
            .unwrap();
        store.add_workout(sample_workout(day)).unwrap();
        store.add_note(sample_note(day, "a", "b")).unwrap();
        store.add_study(sample_study(day, StudyCategory::Course)).unwrap();
        store
            .save_weight(&WeightInput {
                date: day,
                morning_weight: Some(70.0),
                evening_weight: None,
            })
            .unwrap();
        store.save_settings(&Settings {
            nickname: "Ann".to_string(),
            ..Settings::default()
        });

        let exported = store.export_all();
        let json = store.export_json().unwrap();

        let fresh = Store::open_in_memory().unwrap();
        assert!(fresh.clear_all());
        assert!(fresh.import_json(&json));

        assert_eq!(fresh.foods(), exported.foods);
        assert_eq!(fresh.workouts(), exported.workouts);
        assert_eq!(fresh.notes(), exported.notes);
        assert_eq!(fresh.studies(), exported.studies);
        assert_eq!(fresh.settings(), exported.settings);
        assert_eq!(fresh.food_database(), exported.food_database);
        assert_eq!(fresh.weights(), exported.weights);
    }

    #[test]
    fn test_import_absent_fields_untouched() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        let food = store.add_food(sample_food(day)).unwrap();
        store.add_note(sample_note(day, "old", "old")).unwrap();

        assert!(store.import_json(r#"{"notes": [], "unknown": 1}"#));
        assert!(store.notes().is_empty());
        assert_eq!(store.foods(), vec![food]);
    }

    #[test]
    fn test_import_malformed_returns_false() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        store.add_note(sample_note(day, "keep", "me")).unwrap();

        assert!(!store.import_json("not json"));
        assert!(!store.import_json(r#"{"notes": [{"id": 1}]}"#));
        assert_eq!(store.notes().len(), 1);
    }

    #[test]
    fn test_import_rolls_back_when_write_fails() {
        let store = Store::open_in_memory_with(StoreOptions { quota_bytes: 400 }).unwrap();
        let day = date(2024, 6, 15);
        let note = store.add_note(sample_note(day, "keep", "me")).unwrap();

        let data = ImportData {
            notes: Some(vec![]),
            food_database: Some(
                (0..20)
                    .map(|i| crate::models::FoodDatabaseItem {
                        name: format!("food number {i}"),
                        calories_per_100g: 100.0,
                        carbs_per_100g: 10.0,
                        protein_per_100g: 10.0,
                        fat_per_100g: 10.0,
                    })
                    .collect(),
            ),
            ..ImportData::default()
        };

        assert!(!store.import_data(&data));
        assert_eq!(store.notes(), vec![note]);
    }

    #[test]
    fn test_settings_string_goal_keeps_profile() {
        let store = Store::open_in_memory().unwrap();
        store
            .db
            .set(
                Collection::Settings.key(),
                r#"{"nickname":"Ann","height":170,"calorieGoal":"1800"}"#,
            )
            .unwrap();

        let settings = store.settings();
        assert_eq!(settings.nickname, "Ann");
        assert_eq!(settings.height, Some(170.0));
        assert_eq!(settings.calorie_goal, 1800);
    }

    #[test]
    fn test_import_device_workout_and_loose_settings() {
        let store = Store::open_in_memory().unwrap();
        let json = r#"{
            "foods": [{"id": "f1", "date": "2024-06-15", "mealType": "lunch",
                       "name": "米饭", "weight": 200, "calories": 232,
                       "carbs": 51.2, "protein": 5.2, "fat": 0.6,
                       "createdAt": "2024-06-15T04:00:00.000Z"}],
            "workouts": [{"id": "w1", "date": "2024-06-15", "type": "running",
                          "startTime": "2024-06-15T07:00", "duration": "45",
                          "calories": 420, "distance": 7.5, "avgHeartRate": 150,
                          "source": "COROS", "createdAt": "2024-06-15T08:00:00.000Z"}],
            "settings": {"nickname": "Ann", "calorieGoal": "1800", "gender": ""},
            "exportedAt": "2024-06-16T00:00:00.000Z"
        }"#;

        assert!(store.import_json(json));
        assert_eq!(store.foods().len(), 1);
        let workouts = store.workouts();
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].source, WorkoutSource::Imported);
        assert_eq!(workouts[0].duration, 45);
        let settings = store.settings();
        assert_eq!(settings.nickname, "Ann");
        assert_eq!(settings.calorie_goal, 1800);
    }

    #[test]
    fn test_import_sorts_weights_by_date() {
        let store = Store::open_in_memory().unwrap();
        let json = r#"{"weights": [
            {"date": "2024-06-15", "morningWeight": 70.0},
            {"date": "2024-06-01", "morningWeight": 71.0},
            {"date": "2024-06-08", "eveningWeight": 70.6}
        ]}"#;

        assert!(store.import_json(json));
        let dates: Vec<String> = store.weights().into_iter().map(|w| w.date).collect();
        assert_eq!(dates, ["2024-06-01", "2024-06-08", "2024-06-15"]);
        assert_eq!(store.latest_weight().unwrap().date, "2024-06-15");
    }

    #[test]
    fn test_try_delete_separates_missing_from_failed_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fittrack.db");
        let day = date(2024, 6, 15);
        let first = {
            let store = Store::open(&path).unwrap();
            let first = store.add_food(sample_food(day)).unwrap();
            store.add_food(sample_food(day)).unwrap();
            store
                .save_weight(&WeightInput {
                    date: day,
                    morning_weight: Some(70.0),
                    evening_weight: None,
                })
                .unwrap();
            store
                .save_weight(&WeightInput {
                    date: date(2024, 6, 16),
                    morning_weight: Some(69.8),
                    evening_weight: None,
                })
                .unwrap();
            first
        };

        let store = Store::open_with(&path, StoreOptions { quota_bytes: 100 }).unwrap();
        assert!(!store.try_delete::<FoodEntry>("missing").unwrap());
        assert!(matches!(
            store.try_delete::<FoodEntry>(&first.id),
            Err(StoreError::QuotaExceeded { .. })
        ));
        assert!(!store.delete_food(&first.id));
        assert_eq!(store.foods().len(), 2);

        assert!(!store.try_delete_weight(date(2023, 1, 1)).unwrap());
        assert!(store.try_delete_weight(day).is_err());
        assert_eq!(store.weights().len(), 2);
    }

    #[test]
    fn test_clear_all_removes_everything() {
        let store = Store::open_in_memory().unwrap();
        let day = date(2024, 6, 15);
        store.add_food(sample_food(day)).unwrap();
        store.add_workout(sample_workout(day)).unwrap();
        store.save_settings(&Settings::default());

        assert!(store.clear_all());
        assert!(store.db.keys().unwrap().is_empty());
        assert!(store.foods().is_empty());
        assert!(store.workouts().is_empty());
    }
}
