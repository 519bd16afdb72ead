#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors and validation errors are fine; panics are not. Anything
    // that validates must also build a duty map and a sample buffer.
    if let Ok(cfg) = hover_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let params: hover_core::RunParams = (&cfg).into();
            assert!(params.mapping.duty_map().is_ok());
            assert!(hover_core::buffer::init(params.sampler.buffer_size).is_ok());
        }
    }
});
