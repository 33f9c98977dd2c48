//
//  stash-client
//  interactive/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive prompts used by `stash auth login` and destructive commands.

pub mod prompt;
pub mod selector;

pub use prompt::*;
pub use selector::*;

/// Returns `true` when stdin and stdout are terminals, so prompting makes
/// sense.
pub fn is_interactive() -> bool {
    console::user_attended() && console::Term::stdout().is_term()
}
