use super::types::{VoiceInfo, VoicePreferences};

/// Pick a voice: a language match whose name carries one of the preferred
/// fragments, else the first language match.
pub fn select_voice<'a>(voices: &'a [VoiceInfo], prefs: &VoicePreferences) -> Option<&'a VoiceInfo> {
    let language = prefs.language.as_str();
    let matches_language = |voice: &&VoiceInfo| voice.lang.starts_with(language);

    voices
        .iter()
        .filter(matches_language)
        .find(|voice| {
            prefs
                .preferred_names
                .iter()
                .any(|fragment| voice.name.contains(fragment.as_str()))
        })
        .or_else(|| voices.iter().find(matches_language))
}
