mod data;
mod food;
mod helpers;
mod note;
mod settings;
mod study;
mod summary;
mod weight;
mod workout;

pub(crate) use data::{cmd_clear, cmd_export, cmd_import};
pub(crate) use food::{
    NutritionArgs, cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_search, cmd_food_update,
};
pub(crate) use note::{cmd_note_add, cmd_note_delete, cmd_note_list, cmd_note_search};
pub(crate) use settings::{SettingsArgs, cmd_settings_set, cmd_settings_show};
pub(crate) use study::{cmd_study_add, cmd_study_delete, cmd_study_list};
pub(crate) use summary::{Period, cmd_bmi, cmd_meals, cmd_stats, cmd_summary};
pub(crate) use weight::{
    cmd_weight_change, cmd_weight_delete, cmd_weight_history, cmd_weight_log, cmd_weight_show,
};
pub(crate) use workout::{cmd_workout_add, cmd_workout_delete, cmd_workout_list};
