mod day;
mod feedback;
mod food;
mod helpers;
mod meal;
mod recommend;
mod schedule;
mod user;

pub(crate) use day::{cmd_close_day, cmd_ranking, cmd_reminders};
pub(crate) use feedback::{cmd_feedback_list, cmd_feedback_submit};
pub(crate) use food::{cmd_food_add, cmd_food_delete, cmd_food_edit, cmd_food_import, cmd_food_list};
pub(crate) use meal::{cmd_log, cmd_meals};
pub(crate) use recommend::cmd_recommend;
pub(crate) use schedule::{cmd_schedule_set, cmd_schedule_show};
pub(crate) use user::{cmd_user_edit, cmd_user_list, cmd_user_register, cmd_user_show};
