//! HTML templates for the dashboard.
//!
//! Uses a simple template approach with Tailwind CSS and Alpine.js for the
//! admin chrome. Viewer markup lives in [`crate::render`].

pub use rowlens_core::html::escape_html as html_escape;

const HEAD: &str = r##"<meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <script src="https://cdn.tailwindcss.com"></script>
    <script>
        tailwind.config = {
            darkMode: 'class',
            theme: {
                extend: {
                    colors: {
                        primary: {
                            50: '#f0fdfa',
                            100: '#ccfbf1',
                            500: '#14b8a6',
                            600: '#0d9488',
                            700: '#0f766e',
                            900: '#134e4a',
                        }
                    }
                }
            }
        }
    </script>
    <script defer src="https://unpkg.com/alpinejs@3.x.x/dist/cdn.min.js"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
    <link rel="stylesheet" href="/assets/rowlens.css">
    <style>[x-cloak] { display: none !important; }</style>"##;

/// Base HTML layout wrapper.
///
/// `user` is shown in the nav bar with a logout link when present.
pub fn layout(title: &str, user: Option<&str>, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en" x-data="{{ darkMode: localStorage.getItem('darkMode') === 'true', sidebarOpen: true }}" :class="{{ 'dark': darkMode }}">
<head>
    <title>{title} - rowlens</title>
    {HEAD}
</head>
<body class="bg-gray-50 dark:bg-gray-900 min-h-screen">
    {NAV}

    <div class="flex">
        {SIDEBAR}

        <main class="flex-1 p-6 lg:p-8">
            <div class="max-w-7xl mx-auto">
                {content}
            </div>
        </main>
    </div>

</body>
</html>"##,
        title = html_escape(title),
        NAV = nav_template(user),
        SIDEBAR = sidebar_template(),
    )
}

/// Layout without navigation, for the login page.
pub fn bare_layout(title: &str, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <title>{title} - rowlens</title>
    {HEAD}
</head>
<body class="bg-gray-50 dark:bg-gray-900 min-h-screen">
    {content}
</body>
</html>"##,
        title = html_escape(title),
    )
}

fn nav_template(user: Option<&str>) -> String {
    let user_html = user
        .filter(|u| !u.is_empty())
        .map(|u| {
            format!(
                r##"<span class="text-sm"><i class="fas fa-user"></i> {}</span>
                <a href="/logout" class="p-2 hover:bg-primary-700 rounded-lg text-sm" data-testid="rowlens-logout">
                    <i class="fas fa-sign-out-alt"></i> Logout
                </a>"##,
                html_escape(u)
            )
        })
        .unwrap_or_default();

    format!(
        r##"<nav class="bg-primary-600 dark:bg-primary-900 text-white px-4 py-3 sticky top-0 z-50 shadow-lg">
        <div class="flex items-center justify-between">
            <div class="flex items-center gap-4">
                <button @click="sidebarOpen = !sidebarOpen" class="p-2 hover:bg-primary-700 rounded-lg lg:hidden">
                    <i class="fas fa-bars"></i>
                </button>
                <a href="/admin" class="flex items-center gap-2 font-semibold">
                    <i class="fas fa-table"></i> rowlens
                </a>
            </div>
            <div class="flex items-center gap-4">
                {user_html}
                <button @click="darkMode = !darkMode; localStorage.setItem('darkMode', darkMode)"
                        class="p-2 hover:bg-primary-700 rounded-lg">
                    <i class="fas" :class="darkMode ? 'fa-sun' : 'fa-moon'"></i>
                </button>
            </div>
        </div>
    </nav>"##
    )
}

fn sidebar_template() -> &'static str {
    r##"<aside class="w-64 bg-white dark:bg-gray-800 border-r border-gray-200 dark:border-gray-700 min-h-[calc(100vh-56px)] transition-all duration-300"
              :class="{ '-ml-64': !sidebarOpen }"
              x-cloak>
            <nav class="p-4 space-y-2">
                <a href="/admin" class="flex items-center gap-3 px-4 py-3 text-gray-700 dark:text-gray-200 hover:bg-primary-50 dark:hover:bg-primary-900/50 rounded-lg transition-colors">
                    <i class="fas fa-database w-5"></i>
                    <span>Tables</span>
                </a>
                <a href="/view" class="flex items-center gap-3 px-4 py-3 text-gray-700 dark:text-gray-200 hover:bg-primary-50 dark:hover:bg-primary-900/50 rounded-lg transition-colors">
                    <i class="fas fa-eye w-5"></i>
                    <span>Viewer</span>
                </a>
            </nav>
        </aside>"##
}

/// Card component.
pub fn card(title: &str, content: &str) -> String {
    format!(
        r##"<div class="bg-white dark:bg-gray-800 rounded-xl shadow-sm border border-gray-200 dark:border-gray-700 overflow-hidden">
            <div class="px-6 py-4 border-b border-gray-200 dark:border-gray-700">
                <h3 class="text-lg font-semibold text-gray-900 dark:text-white">{title}</h3>
            </div>
            <div class="p-6">
                {content}
            </div>
        </div>"##
    )
}

/// Input field component.
pub fn input(name: &str, label: &str, input_type: &str, value: &str, placeholder: &str) -> String {
    format!(
        r##"<div class="space-y-1">
            <label for="{name}" class="block text-sm font-medium text-gray-700 dark:text-gray-300">{label}</label>
            <input type="{input_type}" name="{name}" id="{name}" value="{value}" placeholder="{placeholder}"
                   class="w-full px-4 py-2 border border-gray-300 dark:border-gray-600 rounded-lg bg-white dark:bg-gray-800 text-gray-900 dark:text-white focus:ring-2 focus:ring-primary-500 focus:border-primary-500">
        </div>"##,
        value = html_escape(value),
    )
}

/// Empty state component.
pub fn empty_state(icon: &str, title: &str, description: &str) -> String {
    format!(
        r##"<div class="text-center py-12">
            <i class="fas fa-{icon} text-4xl text-gray-400 dark:text-gray-600 mb-4"></i>
            <h3 class="text-lg font-medium text-gray-900 dark:text-white">{title}</h3>
            <p class="mt-1 text-gray-500 dark:text-gray-400">{description}</p>
        </div>"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_escapes_title_and_user() {
        let html = layout("<Tables>", Some("<b>eve</b>"), "<p>body</p>");
        assert!(html.contains("&lt;Tables&gt; - rowlens"));
        assert!(html.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("/logout"));
    }

    #[test]
    fn anonymous_layout_has_no_logout() {
        let html = layout("Tables", None, "");
        assert!(!html.contains("/logout"));
    }
}
