//! 页面端脚本
//!
//! 选择器与 x.com 当前的 DOM 结构绑定，页面改版时只需要改这里。
//! 所有脚本都返回一个确定的 JSON 值，不返回 `undefined`。

use crate::models::NodeHandle;

pub const POST_SELECTOR: &str = r#"article[data-testid="tweet"]"#;
pub const PERMALINK_SELECTOR: &str = r#"a[href*="/status/"]"#;
pub const POST_TEXT_SELECTOR: &str = r#"div[data-testid="tweetText"]"#;
pub const REPLY_BUTTON_SELECTOR: &str = r#"button[data-testid="reply"]"#;
pub const COMPOSER_INPUT_SELECTOR: &str = r#"div[role="dialog"] div[role="textbox"]"#;
pub const SUBMIT_BUTTON_SELECTOR: &str = r#"div[role="dialog"] button[data-testid="tweetButton"]"#;
pub const CLOSE_BUTTON_SELECTOR: &str = r#"div[role="dialog"] button[aria-label="Close"]"#;

/// 帖子节点上的句柄属性
pub const HANDLE_ATTRIBUTE: &str = "data-feed-reply-handle";

/// 页面端全局状态的挂载点
const STATE_KEY: &str = "__feedReply";

/// 转成 JS 字符串字面量
fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// 页面端公共函数：给节点分配句柄并采集快照
fn snapshot_fn() -> String {
    format!(
        r#"
        const state = window.{state} = window.{state} || {{ seq: 0, inbox: [], observer: null }};
        const snapshot = (el) => {{
            if (!el.hasAttribute({attr})) el.setAttribute({attr}, String(++state.seq));
            const link = el.querySelector({permalink});
            const textNode = el.querySelector({text});
            return {{
                handle: el.getAttribute({attr}),
                permalink: link ? link.href : null,
                innerText: el.innerText || '',
                text: textNode ? textNode.innerText : ''
            }};
        }};
        "#,
        state = STATE_KEY,
        attr = js_str(HANDLE_ATTRIBUTE),
        permalink = js_str(PERMALINK_SELECTOR),
        text = js_str(POST_TEXT_SELECTOR),
    )
}

/// 通过句柄定位节点的表达式
fn node_expr(handle: &NodeHandle) -> String {
    let selector = format!(r#"[{}="{}"]"#, HANDLE_ATTRIBUTE, handle.as_str().replace('"', ""));
    format!("document.querySelector({})", js_str(&selector))
}

/// 安装 MutationObserver；已有帖子作为一次种子事件写入 inbox
pub fn install_watch() -> String {
    format!(
        r#"(() => {{
            {snapshot}
            if (state.observer) return true;
            const seed = Array.from(document.querySelectorAll({post})).map(snapshot);
            if (seed.length) state.inbox.push({{ candidates: seed }});
            state.observer = new MutationObserver((mutations) => {{
                for (const mutation of mutations) {{
                    for (const node of mutation.addedNodes) {{
                        if (node.nodeType !== 1) continue;
                        const candidates = [];
                        if (node.matches && node.matches({post})) candidates.push(snapshot(node));
                        if (node.querySelectorAll) {{
                            node.querySelectorAll({post})
                                .forEach((el) => candidates.push(snapshot(el)));
                        }}
                        if (candidates.length) state.inbox.push({{ candidates }});
                    }}
                }}
            }});
            state.observer.observe(document.body, {{ childList: true, subtree: true }});
            return true;
        }})()"#,
        snapshot = snapshot_fn(),
        post = js_str(POST_SELECTOR),
    )
}

pub fn remove_watch() -> String {
    format!(
        r#"(() => {{
            const state = window.{state};
            if (!state) return false;
            if (state.observer) state.observer.disconnect();
            state.observer = null;
            state.inbox = [];
            return true;
        }})()"#,
        state = STATE_KEY
    )
}

pub fn drain_insertions() -> String {
    format!(
        r#"(() => {{
            const state = window.{state};
            if (!state) return [];
            const out = state.inbox;
            state.inbox = [];
            return out;
        }})()"#,
        state = STATE_KEY
    )
}

pub fn current_url() -> &'static str {
    "location.href"
}

pub fn current_path() -> &'static str {
    "location.pathname"
}

pub fn scroll_by(dy: i64) -> String {
    format!("(() => {{ window.scrollBy(0, {}); return true; }})()", dy)
}

/// 按 ID 查找帖子，返回 0 或 1 个快照
pub fn locate_post(id: &str) -> String {
    format!(
        r#"(() => {{
            {snapshot}
            const wanted = {id};
            for (const el of document.querySelectorAll({post})) {{
                const link = el.querySelector({permalink});
                if (!link) continue;
                const parts = link.href.split('/status/');
                if (parts.length > 1 && parts[1].split(/[/?#]/)[0] === wanted) {{
                    return [snapshot(el)];
                }}
            }}
            return [];
        }})()"#,
        snapshot = snapshot_fn(),
        id = js_str(id),
        post = js_str(POST_SELECTOR),
        permalink = js_str(PERMALINK_SELECTOR),
    )
}

pub fn is_attached(handle: &NodeHandle) -> String {
    format!(
        "(() => {{ const el = {}; return !!el && document.body.contains(el); }})()",
        node_expr(handle)
    )
}

pub fn scroll_into_view(handle: &NodeHandle) -> String {
    format!(
        r#"(() => {{
            const el = {};
            if (!el) return false;
            el.scrollIntoView({{ behavior: 'smooth', block: 'center' }});
            return true;
        }})()"#,
        node_expr(handle)
    )
}

pub fn display_text(handle: &NodeHandle) -> String {
    format!(
        r#"(() => {{
            const el = {};
            if (!el) return '';
            const textNode = el.querySelector({});
            return textNode ? textNode.innerText : '';
        }})()"#,
        node_expr(handle),
        js_str(POST_TEXT_SELECTOR)
    )
}

pub fn click_reply(handle: &NodeHandle) -> String {
    format!(
        r#"(() => {{
            const el = {};
            const button = el && el.querySelector({});
            if (!button) return false;
            button.click();
            return true;
        }})()"#,
        node_expr(handle),
        js_str(REPLY_BUTTON_SELECTOR)
    )
}

pub fn composer_ready() -> String {
    format!(
        "(() => !!document.querySelector({}))()",
        js_str(COMPOSER_INPUT_SELECTOR)
    )
}

pub fn focus_composer() -> String {
    format!(
        r#"(() => {{
            const input = document.querySelector({});
            if (!input) return false;
            input.focus();
            return true;
        }})()"#,
        js_str(COMPOSER_INPUT_SELECTOR)
    )
}

/// 全选 → insertText → change，让页面内部状态识别到新内容
pub fn insert_composer_text(text: &str) -> String {
    format!(
        r#"(() => {{
            const input = document.querySelector({selector});
            if (!input) return false;
            document.execCommand('selectAll', false, null);
            document.execCommand('insertText', false, {text});
            input.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return true;
        }})()"#,
        selector = js_str(COMPOSER_INPUT_SELECTOR),
        text = js_str(text),
    )
}

pub fn submit_state() -> String {
    format!(
        r#"(() => {{
            const button = document.querySelector({});
            if (!button) return 'missing';
            const ariaDisabled = button.getAttribute('aria-disabled') === 'true';
            if (button.disabled || ariaDisabled) return 'disabled';
            return 'enabled';
        }})()"#,
        js_str(SUBMIT_BUTTON_SELECTOR)
    )
}

pub fn click_submit() -> String {
    click_global(SUBMIT_BUTTON_SELECTOR)
}

pub fn close_composer() -> String {
    click_global(CLOSE_BUTTON_SELECTOR)
}

fn click_global(selector: &str) -> String {
    format!(
        r#"(() => {{
            const button = document.querySelector({});
            if (!button) return false;
            button.click();
            return true;
        }})()"#,
        js_str(selector)
    )
}
