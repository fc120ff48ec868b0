//! Conditional visibility for editor configuration files
//!
//! Blocks of a JSON-with-comments document can be annotated with
//! `// @sync host=... os=... env=...` or `// @sync-ignore`. On export every
//! annotated block is commented out; on import `@sync` blocks are shown or
//! hidden depending on the machine, and the machine's own `@sync-ignore`
//! blocks are carried over from its previous copy of the file.
//!
//! ```
//! use syncify_pragma::{Os, PragmaContext, PragmaEngine};
//!
//! let engine = PragmaEngine::new(PragmaContext::new(Some(Os::Linux), "work"));
//! let shown = engine.incoming("// @sync host=work\n// \"x\": 1", None);
//! assert_eq!(shown.text, "// @sync host=work\n\"x\": 1");
//! ```

pub mod annotation;
pub mod condition;
pub mod engine;
pub mod error;
pub mod jsonc;
pub mod scanner;

pub use annotation::{Pragma, PragmaKind};
pub use condition::{Os, PragmaContext, Verdict};
pub use engine::{PragmaEngine, Transformed, incoming, outgoing};
pub use error::{Error, Result};
pub use scanner::{LineAction, LineRole, ScannedLine, Scanner};
