/// Format the advisory emitted when a caller-supplied target class
/// disagrees with the network's top-1 prediction.
pub fn format_class_mismatch(predicted: usize, requested: usize) -> String {
    format!(
        "predicted class index {} does not equal the target class index {}; \
         calculating the gradient w.r.t. the predicted class",
        predicted, requested
    )
}

/// Format the prediction line logged by the visualization wrapper.
pub fn format_prediction(class: Option<usize>) -> String {
    match class {
        Some(c) => format!("model predicted class {}", c),
        None => "model produced a single logit; no target class selected".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_class_mismatch() {
        assert_eq!(
            format_class_mismatch(3, 7),
            "predicted class index 3 does not equal the target class index 7; \
             calculating the gradient w.r.t. the predicted class"
        );
    }

    #[test]
    fn test_format_prediction() {
        assert_eq!(format_prediction(Some(5)), "model predicted class 5");
        assert_eq!(
            format_prediction(None),
            "model produced a single logit; no target class selected"
        );
    }
}
