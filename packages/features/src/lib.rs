//! # Vellum Features
//!
//! Content features built on the conversion engine. Each feature registers
//! its schema items and the converters for both pipelines.
//!
//! | Feature      | Model                        | View                                        |
//! |--------------|------------------------------|---------------------------------------------|
//! | `paragraph`  | `paragraph` (`$block`)       | `<p>`                                       |
//! | `blockQuote` | `blockQuote` (holds blocks)  | `<blockquote>`                              |
//! | `alignment`  | `alignment` on `paragraph`   | `data-align`                                |
//! | `image`      | `image` (object, `src` req.) | `<figure class="image"><img src alt></figure>` |

mod alignment;
mod block_quote;
mod image;
mod paragraph;

pub use alignment::{Alignment, ALIGNMENT, ALIGNMENT_VALUES, DATA_ALIGN};
pub use block_quote::{BlockQuote, BLOCK_QUOTE};
pub use image::{image_label, image_view, Image, IMAGE};
pub use paragraph::{Paragraph, PARAGRAPH};

use vellum_conversion::Feature;

/// Every feature in this crate, in setup order
pub fn standard_features() -> Vec<Box<dyn Feature>> {
    vec![
        Box::new(Paragraph),
        Box::new(BlockQuote),
        Box::new(Alignment),
        Box::new(Image),
    ]
}
