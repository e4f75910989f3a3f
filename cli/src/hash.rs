#![deny(missing_docs)]

//! # Hash Command
//!
//! Prints the storage names derived from a remote id.

use vault_core::naming::{hash_for_id, storage_database_name, storage_name};

/// Arguments for the hash command.
#[derive(clap::Args, Debug, Clone)]
pub struct HashArgs {
    /// Remote id of a content type or space.
    pub id: String,
}

/// Lines printed for `args`.
pub fn render(args: &HashArgs) -> Vec<String> {
    vec![
        format!("hash:     {}", hash_for_id(&args.id)),
        format!("table:    {}", storage_name(&args.id)),
        format!("database: {}", storage_database_name(&args.id)),
    ]
}

/// Executes the hash command.
pub fn execute(args: &HashArgs) {
    for line in render(args) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let lines = render(&HashArgs { id: "cat".into() });
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(&format!("entry_{}", hash_for_id("cat"))));
        assert!(lines[2].contains("space_"));
    }
}
