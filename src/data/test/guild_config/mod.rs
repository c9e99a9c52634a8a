use crate::{
    data::guild_config::GuildConfigRepository,
    error::AppError,
    model::autoresponder::{AutoResponder, GuildAutoResponders},
};
use sea_orm::{EntityTrait, PaginatorTrait};
use test_utils::{builder::TestBuilder, factory::guild_config::GuildConfigFactory};

mod ensure;
mod get_all_with_autoresponders;
mod get_by_guild_id;
mod set_autoresponders;
