pub mod path;

pub use path::{
    ancestors, file_name, is_same_or_descendant, rebase, remove_tree_keys, rename_tree_keys,
};
