use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// 创建挂载根目录：A 没有目标子目录，B 有 2 个，C 有 3 个
pub fn create_mount_root() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("A/Other")).unwrap();
    fs::create_dir_all(root.join("B/Documents")).unwrap();
    fs::create_dir_all(root.join("B/Music")).unwrap();
    fs::create_dir_all(root.join("C/Documents")).unwrap();
    fs::create_dir_all(root.join("C/Music")).unwrap();
    fs::create_dir_all(root.join("C/Pictures")).unwrap();

    // 同名文件不算目录
    fs::write(root.join("A/Pictures"), b"not a directory").unwrap();

    temp_dir
}

/// 部分文件系统的时间戳只精确到秒
const TIMESTAMP_GRANULARITY: Duration = Duration::from_millis(1100);

/// 依次创建目录，保证状态变更时间递增。ctime 无法手动设置，只能等待
pub fn create_in_order(root: &Path, names: &[&str]) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            std::thread::sleep(TIMESTAMP_GRANULARITY);
        }
        fs::create_dir_all(root.join(name)).unwrap();
    }
}

pub fn candidates() -> Vec<String> {
    vec![
        "Documents".to_string(),
        "Music".to_string(),
        "Pictures".to_string(),
    ]
}
