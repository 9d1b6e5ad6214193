/// Port the tileset catalog server listens on.
pub const DEFAULT_PORT: u16 = 3001;

/// Directory served statically under `/public`.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Root walked for tileset descriptors.
pub const DEFAULT_TILES_DIR: &str = "public/3DTiles";

/// Descriptor files are matched on this extension only.
pub const TILESET_EXTENSION: &str = "json";

pub const TILESETS_ROUTE: &str = "/api/tilesets";
