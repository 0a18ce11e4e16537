//! AppleScript sources for the automation calls.
//!
//! Application and process names arrive from configuration and are
//! interpolated into script string literals, so they are escaped first.

/// Escape a value for use inside an AppleScript double-quoted literal.
pub(crate) fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub(crate) fn process_exists(process_name: &str) -> String {
    format!(
        r#"tell application "System Events"
    return exists (processes where name is "{name}")
end tell"#,
        name = escape(process_name)
    )
}

pub(crate) fn frontmost_process() -> String {
    r#"tell application "System Events"
    return name of first process where it is frontmost
end tell"#
        .to_string()
}

/// The direct save request: enumerate open documents in order, save each one
/// whose modified flag is set, and report aggregate counts. A failing save is
/// skipped so one bad document does not abort the batch.
pub(crate) fn save_modified_documents(app_name: &str) -> String {
    format!(
        r#"tell application "{name}"
    set docCount to count of documents
    set savedCount to 0
    set modifiedCount to 0

    if docCount is 0 then
        return "no documents"
    end if

    repeat with i from 1 to docCount
        set currentDoc to document i
        try
            if modified of currentDoc then
                set modifiedCount to modifiedCount + 1
                save currentDoc
                set savedCount to savedCount + 1
            end if
        on error errMsg
            -- continue with the next document
        end try
    end repeat

    return "checked:" & docCount & ",modified:" & modifiedCount & ",saved:" & savedCount
end tell"#,
        name = escape(app_name)
    )
}

pub(crate) fn set_frontmost(process_name: &str) -> String {
    format!(
        r#"tell application "System Events"
    tell process "{name}"
        set frontmost to true
    end tell
end tell"#,
        name = escape(process_name)
    )
}

/// Save All shortcut (Cmd+Option+S). Not every Acrobat version binds it,
/// which is why the caller downgrades to [`keystroke_save`] on error.
pub(crate) fn keystroke_save_all(process_name: &str) -> String {
    format!(
        r#"tell application "System Events"
    tell process "{name}"
        keystroke "s" using {{command down, option down}}
    end tell
end tell"#,
        name = escape(process_name)
    )
}

/// Plain save shortcut (Cmd+S).
pub(crate) fn keystroke_save(process_name: &str) -> String {
    format!(
        r#"tell application "System Events"
    tell process "{name}"
        keystroke "s" using command down
    end tell
end tell"#,
        name = escape(process_name)
    )
}
