use std::path::Path;

/// Languages GraphQL sources can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Raw GraphQL files (.graphql, .gql, .gqls)
    GraphQL,
    /// TypeScript (.ts, .tsx, .mts, .cts)
    TypeScript,
    /// JavaScript (.js, .jsx, .mjs, .cjs)
    JavaScript,
    /// Vue Single File Components (.vue)
    Vue,
    /// Svelte components (.svelte)
    Svelte,
    /// Astro components (.astro)
    Astro,
}

impl Language {
    /// Detect language from file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        match extension {
            "graphql" | "gql" | "gqls" => Some(Self::GraphQL),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "vue" => Some(Self::Vue),
            "svelte" => Some(Self::Svelte),
            "astro" => Some(Self::Astro),
            _ => None,
        }
    }

    /// Whether GraphQL in files of this language is embedded in template
    /// literals rather than being the whole file
    #[must_use]
    pub const fn embeds_graphql(self) -> bool {
        !matches!(self, Self::GraphQL)
    }
}
