//! Key commands (DEL, EXISTS)

use super::{Command, CommandResult, count_reply};
use crate::store::Keyspace;
use bytes::Bytes;

/// DEL command - Delete one or more keys
///
/// Syntax: DEL key [key ...]
pub struct DelCommand;

impl Command for DelCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let deleted = args.iter().filter(|key| ks.delete(key)).count();
        Ok(count_reply(deleted))
    }

    fn name(&self) -> &'static str {
        "DEL"
    }

    fn min_args(&self) -> usize {
        1
    }
}

/// EXISTS command - Count how many of the given keys exist
///
/// Syntax: EXISTS key [key ...]
pub struct ExistsCommand;

impl Command for ExistsCommand {
    fn execute(&self, ks: &mut Keyspace, args: &[Bytes]) -> CommandResult {
        let count = args.iter().filter(|key| ks.exists(key)).count();
        Ok(count_reply(count))
    }

    fn name(&self) -> &'static str {
        "EXISTS"
    }

    fn min_args(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RespValue;
    use crate::store::Value;

    #[test]
    fn test_del_counts_existing() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("a"), Value::string("1"));
        ks.set(Bytes::from("b"), Value::string("2"));

        let args = vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")];
        assert_eq!(DelCommand.execute(&mut ks, &args), Ok(RespValue::Integer(2)));
        assert!(ks.is_empty());
    }

    #[test]
    fn test_exists_counts_repeats() {
        let mut ks = Keyspace::new();
        ks.set(Bytes::from("a"), Value::string("1"));

        let args = vec![Bytes::from("a"), Bytes::from("a"), Bytes::from("x")];
        assert_eq!(ExistsCommand.execute(&mut ks, &args), Ok(RespValue::Integer(2)));
    }
}
