pub mod gaps;
pub mod localization;
pub mod needleman_wunsch;
pub mod normalize;
pub mod quality;
pub mod repetition;
pub mod report;
pub mod timecode;
