use crate::object::ObjectKind;

pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const LINK: &str = "🔗";
    pub const DATABASE: &str = "🗄️";
    pub const SCHEMA: &str = "📁";
    pub const TABLE: &str = "📋";
    pub const VIEW: &str = "👁️";
    pub const FUNCTION: &str = "⚙️";
    pub const TRIGGER: &str = "⚡";
    pub const SEQUENCE: &str = "🔢";
    pub const TYPE: &str = "🧩";
    pub const INDEX: &str = "📇";
    pub const CONSTRAINT: &str = "🔒";
    pub const UP: &str = "⬆️";
    pub const DOWN: &str = "⬇️";
    pub const CLOCK: &str = "⏱️";
    pub const GLOBE: &str = "🌐";

    pub fn for_kind(kind: ObjectKind) -> &'static str {
        match kind {
            ObjectKind::Table => Self::TABLE,
            ObjectKind::View | ObjectKind::MaterializedView => Self::VIEW,
            ObjectKind::Function | ObjectKind::Procedure => Self::FUNCTION,
            ObjectKind::Trigger => Self::TRIGGER,
            ObjectKind::Sequence => Self::SEQUENCE,
            ObjectKind::Type => Self::TYPE,
            ObjectKind::Index => Self::INDEX,
            ObjectKind::Constraint => Self::CONSTRAINT,
        }
    }
}
