//! Command registry
//!
//! Every command is a unit struct, so the tables below hold `'static`
//! references and the registry is just an index from name to handler.

use super::{Command, admin, counter, hash, key, list, search, set, string, ttl, zset};
use std::collections::HashMap;

const STRINGS: &[&dyn Command] = &[
    &string::SetCommand,
    &string::GetCommand,
    &string::MGetCommand,
    &string::MSetCommand,
    &string::AppendCommand,
    &counter::IncrCommand,
    &counter::IncrByCommand,
];

const KEYS: &[&dyn Command] = &[
    &key::DelCommand,
    &key::ExistsCommand,
    &ttl::ExpireCommand,
    &ttl::TtlCommand,
    &search::KeysCommand,
];

const LISTS: &[&dyn Command] = &[
    &list::LPushCommand,
    &list::RPushCommand,
    &list::LPopCommand,
    &list::RPopCommand,
    &list::LRangeCommand,
    &list::LIndexCommand,
    &list::LLenCommand,
    &list::LRemCommand,
];

const SETS: &[&dyn Command] = &[
    &set::SAddCommand,
    &set::SRemCommand,
    &set::SMembersCommand,
    &set::SIsMemberCommand,
    &set::SCardCommand,
    &set::SRandMemberCommand,
    &set::SPopCommand,
    &set::SDiffCommand,
    &set::SInterCommand,
    &set::SUnionCommand,
    &set::SDiffStoreCommand,
    &set::SInterStoreCommand,
    &set::SUnionStoreCommand,
];

const ZSETS: &[&dyn Command] = &[
    &zset::ZAddCommand,
    &zset::ZRemCommand,
    &zset::ZRangeCommand,
    &zset::ZRevRangeCommand,
    &zset::ZRangeByScoreCommand,
    &zset::ZRevRangeByScoreCommand,
    &zset::ZIncrByCommand,
    &zset::ZCardCommand,
    &zset::ZCountCommand,
    &zset::ZRankCommand,
    &zset::ZScoreCommand,
];

const HASHES: &[&dyn Command] = &[
    &hash::HSetCommand,
    &hash::HGetCommand,
    &hash::HMGetCommand,
    &hash::HGetAllCommand,
    &hash::HKeysCommand,
    &hash::HValsCommand,
    &hash::HExistsCommand,
    &hash::HDelCommand,
    &hash::HLenCommand,
    &hash::HIncrByCommand,
    &hash::HIncrByFloatCommand,
];

const ADMIN: &[&dyn Command] = &[&admin::PingCommand, &admin::FlushDbCommand];

/// Name to handler index over every command
pub struct CommandRegistry {
    commands: HashMap<&'static str, &'static dyn Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let commands = [STRINGS, KEYS, LISTS, SETS, ZSETS, HASHES, ADMIN]
            .into_iter()
            .flatten()
            .map(|&command| (command.name(), command))
            .collect();
        CommandRegistry { commands }
    }

    /// Look a command up by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&'static dyn Command> {
        if let Some(&command) = self.commands.get(name) {
            return Some(command);
        }
        self.commands.get(name.to_ascii_uppercase().as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
