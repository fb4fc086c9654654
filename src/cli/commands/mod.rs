pub mod config;
pub mod data;
pub mod entry;
pub mod report;
pub mod system;
pub mod transaction;

use crate::cli::registry::{CommandGroup, CommandRegistry};

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    registry.register_group(CommandGroup::Entry, entry::definitions());
    registry.register_group(CommandGroup::Records, transaction::definitions());
    registry.register_group(CommandGroup::Reports, report::definitions());
    registry.register_group(CommandGroup::Data, data::definitions());
    registry.register_group(CommandGroup::Settings, config::definitions());
    registry.register_group(CommandGroup::Shell, system::definitions());
}
