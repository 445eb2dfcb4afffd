use std::path::PathBuf;

xflags::xflags! {
    /// Render pages and slide decks from key/value data sources.
    cmd mkpage {
        /// Render `key=value` data sources into a page template.
        cmd page {
            /// Data sources as `key=value` pairs.
            repeated pairs: String
            /// A template file or a directory of `*.tmpl` files.
            repeated -t, --template template: PathBuf
            /// Write the page here instead of to stdout.
            optional -o, --output output: PathBuf
            /// Seconds to wait for each URL data source.
            optional --timeout seconds: u64
        }

        /// Split a Markdown document into slides and render each one.
        cmd slides {
            /// The Markdown document.
            required markdown: PathBuf
            /// Data sources as `key=value` pairs.
            repeated pairs: String
            /// A template file or a directory of `*.tmpl` files.
            repeated -t, --template template: PathBuf
            /// The directory to write slides to.
            optional -d, --directory directory: PathBuf
            /// Also write a table of contents slide.
            optional --toc
            /// Seconds to wait for each URL data source.
            optional --timeout seconds: u64
        }

        /// Print a document's front matter.
        cmd frontmatter {
            /// The document. Reads stdin if omitted.
            optional file: PathBuf
            /// Print the front matter as JSON.
            optional -j, --json
        }

        /// Print the code blocks of a Markdown document in one language.
        cmd codesnip {
            required language: String
            /// The document. Reads stdin if omitted.
            optional file: PathBuf
        }

        /// Print the first byline of a document.
        cmd byline {
            /// The document. Reads stdin if omitted.
            optional file: PathBuf
            /// Print the first title instead.
            optional --title
            /// Match this regular expression instead.
            optional -e, --expression expression: String
        }

        /// Print the relative path from a document to a target.
        cmd reldocpath {
            required source: String
            required target: String
        }

        /// Print a built-in template.
        cmd show-template {
            /// `page.tmpl` or `slides.tmpl`.
            optional name: String
        }
    }
}
