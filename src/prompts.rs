pub const SCENE_TO_PROMPT: &str = include_str!("../data/prompts/scene_to_prompt.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Embed a scene description into the prompt-synthesis instruction.
pub fn scene_instruction(scene: &str) -> String {
    render(SCENE_TO_PROMPT, &[("scene", scene)])
}
