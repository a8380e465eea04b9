pub mod delay;
pub mod halt;
pub mod passthru;
pub mod trace;
