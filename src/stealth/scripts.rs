//! Evasion scripts registered to run before any page script
//!
//! Each script reads its values from `window.__stealthProfile`, which the
//! bootstrap script defines first.

/// Hide the `navigator.webdriver` automation flag
pub const NAVIGATOR_WEBDRIVER: &str = r"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
    });
";

/// Report 16px geometry for broken images
///
/// Headless Chrome reports 0×0 for images that failed to load, while real
/// browsers report the size of the broken-image icon.
pub const IMAGE_GEOMETRY: &str = r"
    ['height', 'width'].forEach(property => {
        const imageDescriptor = Object.getOwnPropertyDescriptor(HTMLImageElement.prototype, property);
        Object.defineProperty(HTMLImageElement.prototype, property, {
            ...imageDescriptor,
            get: function() {
                if (this.complete && this.naturalHeight == 0) {
                    return 16;
                }
                return imageDescriptor.get.apply(this);
            },
        });
    });
";

/// Vendor, platform, languages and core count from the profile
pub const NAVIGATOR_IDENTITY: &str = r"
    (() => {
        const profile = window.__stealthProfile || {};
        const define = (name, value) => {
            if (value === undefined) return;
            Object.defineProperty(Object.getPrototypeOf(navigator), name, {
                get: () => value,
                configurable: true,
            });
        };
        define('vendor', profile.vendor);
        define('platform', profile.platform);
        define('languages', profile.languages ? Object.freeze([...profile.languages]) : undefined);
        define('language', profile.languages ? profile.languages[0] : undefined);
        define('hardwareConcurrency', profile.hardwareConcurrency);
    })();
";

/// Non-empty plugin list like a desktop Chrome install
pub const NAVIGATOR_PLUGINS: &str = r"
    (() => {
        const mockPlugins = [
            { name: 'Chrome PDF Plugin', description: 'Portable Document Format', filename: 'internal-pdf-viewer' },
            { name: 'Chrome PDF Viewer', description: '', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai' },
            { name: 'Native Client', description: '', filename: 'internal-nacl-plugin' },
        ];
        const pluginsProto = Object.getPrototypeOf(navigator.plugins);
        Object.defineProperty(navigator, 'plugins', {
            get: () => {
                const plugins = {};
                mockPlugins.forEach((plugin, i) => {
                    plugins[i] = plugin;
                    plugins[plugin.name] = plugin;
                });
                Object.setPrototypeOf(plugins, pluginsProto);
                Object.defineProperty(plugins, 'length', { value: mockPlugins.length });
                return plugins;
            },
        });
    })();
";

/// `window.chrome.runtime` exists in real Chrome, not in headless
pub const CHROME_RUNTIME: &str = r"
    if (!window.chrome) {
        window.chrome = {};
    }
    if (!window.chrome.runtime) {
        window.chrome.runtime = {
            connect: () => ({
                onMessage: { addListener: () => {}, removeListener: () => {} },
                postMessage: () => {},
            }),
        };
    }
";

/// Notification permission query consistent with `Notification.permission`
pub const PERMISSIONS_QUERY: &str = r"
    (() => {
        if (!window.navigator.permissions || !window.Notification) return;
        const originalQuery = window.navigator.permissions.query.bind(window.navigator.permissions);
        window.navigator.permissions.query = (parameters) =>
            parameters && parameters.name === 'notifications'
                ? Promise.resolve({ state: Notification.permission })
                : originalQuery(parameters);
    })();
";

/// Injection order; the profile bootstrap is always prepended.
pub const EVASION_SCRIPTS: &[(&str, &str)] = &[
    ("navigator_webdriver", NAVIGATOR_WEBDRIVER),
    ("image_geometry", IMAGE_GEOMETRY),
    ("navigator_identity", NAVIGATOR_IDENTITY),
    ("navigator_plugins", NAVIGATOR_PLUGINS),
    ("chrome_runtime", CHROME_RUNTIME),
    ("permissions_query", PERMISSIONS_QUERY),
];
