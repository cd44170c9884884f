//! # PantryLine Core — Location Resolution & Conversation Engine
//!
//! Takes a spoken or typed free-text address, resolves it to coordinates,
//! ranks the active food pantries by great-circle distance, and narrates the
//! nearest one back through the conversation turn loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Conversation Session                      │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ SpeechInput │→ │ Conversation │→ │  PantryResolver    │  │
//! │  │ (recognize) │  │ StateMachine │  │  normalize→geocode │  │
//! │  └─────────────┘  └──────────────┘  │  →rank→narrate     │  │
//! │         ↑                ↓          └────────────────────┘  │
//! │  ┌─────────────┐  ┌──────────────┐           ↓              │
//! │  │SpeechOutput │← │  Directives  │  ┌────────────────────┐  │
//! │  │   (speak)   │  │ Speak/Listen │  │ Geocode providers  │  │
//! │  └─────────────┘  └──────────────┘  │ Google / Nominatim │  │
//! └─────────────────────────────────────┴────────────────────┴──┘
//! ```

pub mod address;
pub mod config;
pub mod conversation;
pub mod error;
pub mod geocode;
pub mod pantry;
pub mod ranking;
pub mod resolver;
pub mod session;
pub mod speech;

pub use address::{normalize, Address};
pub use config::CoreConfig;
pub use conversation::{
    ConversationContext, ConversationEvent, ConversationState, Directive, GREETING,
};
pub use error::{AssistantError, Result};
pub use geocode::{
    create_geocoder, resolve_user_address, GeoCoordinate, GeocodeProvider, GoogleGeocoder,
    NominatimGeocoder, ProviderKind,
};
pub use pantry::{
    HttpPantryGateway, Pantry, PantryGateway, PantryHours, PantryStatus, StaticPantryGateway,
};
pub use ranking::{haversine_km, rank, RankedPantry};
pub use resolver::{PantryResolver, Resolution};
pub use session::{reset_conversation, run_conversation};
pub use speech::{ScriptedSpeechInput, SilentSpeechOutput, SpeechInput, SpeechOutput};
