use crate::models::RouteNode;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
pub const NOT_FOUND_PATH: &str = "/404";
pub const FORBIDDEN_PATH: &str = "/403";
pub const REDIRECT_HELPER_PREFIX: &str = "/redirect";

/// Catch-all alias of the not-found page; matches any unmatched path.
pub const CATCH_ALL_PATTERN: &str = "/:pathMatch(.*)*";

/// constant_routes
///
/// The console's static route tree. Hidden pages (redirect helper, error
/// pages, login) carry no name; everything reachable from the menu does.
pub fn constant_routes() -> Vec<RouteNode> {
    vec![
        RouteNode::new(REDIRECT_HELPER_PREFIX)
            .view("layouts/index")
            .hidden()
            .children(vec![RouteNode::new(":path(.*)").view("pages/redirect/index")]),
        RouteNode::new(FORBIDDEN_PATH)
            .view("pages/error/403")
            .hidden(),
        RouteNode::new(NOT_FOUND_PATH)
            .view("pages/error/404")
            .hidden()
            .alias(CATCH_ALL_PATTERN),
        RouteNode::new(LOGIN_PATH)
            .view("pages/login/index")
            .hidden(),
        RouteNode::new(HOME_PATH)
            .view("layouts/index")
            .redirect("/dashboard")
            .children(vec![
                RouteNode::new("dashboard")
                    .view("pages/dashboard/index")
                    .name("Dashboard")
                    .title("首页")
                    .svg_icon("dashboard")
                    .affix(),
            ]),
        RouteNode::new("/listener")
            .view("layouts/index")
            .redirect("/listener/https")
            .name("Listener")
            .title("监听器")
            .el_icon("Connection")
            .children(vec![
                RouteNode::new("https")
                    .view("pages/listener/https")
                    .name("HttpsListener")
                    .title("HTTPS 监听器")
                    .keep_alive(),
            ]),
        RouteNode::new("/demo")
            .view("layouts/index")
            .redirect("/demo/element-plus")
            .name("Demo")
            .title("示例集合")
            .el_icon("DataBoard")
            .children(vec![
                RouteNode::new("element-plus")
                    .view("pages/demo/element-plus/index")
                    .name("ElementPlus")
                    .title("Element Plus")
                    .keep_alive(),
                RouteNode::new("level2")
                    .view("pages/demo/level2/index")
                    .redirect("/demo/level2/level3")
                    .name("Level2")
                    .title("二级路由")
                    .always_show()
                    .children(vec![
                        RouteNode::new("level3")
                            .view("pages/demo/level2/level3/index")
                            .name("Level3")
                            .title("三级路由")
                            .keep_alive(),
                    ]),
                RouteNode::new("composable-demo")
                    .redirect("/demo/composable-demo/use-fetch-select")
                    .name("ComposableDemo")
                    .title("组合式函数")
                    .children(vec![
                        RouteNode::new("use-fetch-select")
                            .view("pages/demo/composable-demo/use-fetch-select")
                            .name("UseFetchSelect")
                            .title("useFetchSelect"),
                        RouteNode::new("use-fullscreen-loading")
                            .view("pages/demo/composable-demo/use-fullscreen-loading")
                            .name("UseFullscreenLoading")
                            .title("useFullscreenLoading"),
                    ]),
            ]),
        RouteNode::new("/link")
            .title("文档链接")
            .el_icon("Link")
            .children(vec![
                RouteNode::new("https://juejin.cn/post/7445151895121543209")
                    .name("Link1")
                    .title("中文文档"),
                RouteNode::new("https://juejin.cn/column/7207659644487139387")
                    .name("Link2")
                    .title("新手教程"),
            ]),
    ]
}

/// Joins a child path onto its parent's absolute path. Absolute child paths
/// and external URLs stand on their own.
pub fn join_path(parent: &str, child: &str) -> String {
    if child.starts_with('/') || crate::models::is_external_path(child) {
        return child.to_string();
    }
    if child.is_empty() {
        return parent.to_string();
    }
    format!("{}/{}", parent.trim_end_matches('/'), child)
}
