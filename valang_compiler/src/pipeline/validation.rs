/// Check that every compiler stage has its log codes registered
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating compiler pipeline configuration");

    crate::lexical::init_lexical_analysis_logging()?;
    crate::syntax::init_syntax_logging()?;
    crate::dates::init_date_logging()?;
    crate::codegen::init_translation_logging()?;

    crate::log_success!(
        crate::logging::codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Compiler pipeline validation succeeded",
        "stages_validated" => 4
    );

    Ok(())
}
