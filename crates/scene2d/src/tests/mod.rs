//! Cross-module tests exercising a whole frame: mutate, prepare, cull

mod frame_pipeline;
