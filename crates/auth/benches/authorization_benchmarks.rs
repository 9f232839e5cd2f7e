use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use staffroom_auth::{
    MenuItem, ModuleAccess, ModuleKey, PermissionMap, RoleCode, StaffIdentity, StaffRole,
    normalize_role, visible_menu,
};
use staffroom_core::StaffId;

fn bench_identity(role: StaffRole) -> StaffIdentity {
    StaffIdentity {
        staff_id: StaffId::new(),
        display_name: "Bench Staff".to_string(),
        raw_role: RoleCode::new(role.as_str().to_string()),
        role,
    }
}

fn synthetic_menu(len: usize) -> Vec<MenuItem> {
    (0..len)
        .map(|i| {
            MenuItem::new(
                format!("/module-{i}"),
                format!("Module {i}"),
                format!("module-{i}"),
            )
        })
        .collect()
}

fn half_granted_map(menu: &[MenuItem]) -> PermissionMap {
    menu.iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 0)
        .map(|(_, item)| (item.module.clone(), ModuleAccess::full()))
        .collect()
}

fn bench_normalize_role(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_role");
    group.throughput(Throughput::Elements(1));

    let codes = [
        ("exact", "TRANSPORT"),
        ("pattern_hit_first", "ROLE_TRANSPORT_INCHARGE"),
        ("pattern_hit_last", "SCHOOL_ADMIN"),
        ("fallback", "ROLE_GROUNDSKEEPER"),
    ];

    for (name, code) in codes {
        group.bench_with_input(BenchmarkId::new("code", name), &code, |b, code| {
            b.iter(|| black_box(normalize_role(black_box(code), None)));
        });
    }

    group.finish();
}

fn bench_visible_menu(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_menu");

    for menu_len in [10usize, 100, 1000] {
        let menu = synthetic_menu(menu_len);
        let map = half_granted_map(&menu);
        let staff = bench_identity(StaffRole::Teacher);
        let admin = bench_identity(StaffRole::Admin);

        group.throughput(Throughput::Elements(menu_len as u64));
        group.bench_with_input(
            BenchmarkId::new("filtered", menu_len),
            &menu_len,
            |b, _| {
                b.iter(|| black_box(visible_menu(&menu, Some(&staff), &map)));
            },
        );
        group.bench_with_input(BenchmarkId::new("bypass", menu_len), &menu_len, |b, _| {
            b.iter(|| black_box(visible_menu(&menu, Some(&admin), &map)));
        });
    }

    group.finish();
}

fn bench_permission_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("permission_lookup");
    group.throughput(Throughput::Elements(1));

    let menu = synthetic_menu(100);
    let map = half_granted_map(&menu);
    let present = ModuleKey::new("module-0");
    let absent = ModuleKey::new("module-1");

    group.bench_function("present_key", |b| {
        b.iter(|| black_box(map.allows(black_box(&present))));
    });
    group.bench_function("absent_key", |b| {
        b.iter(|| black_box(map.allows(black_box(&absent))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize_role,
    bench_visible_menu,
    bench_permission_lookup
);
criterion_main!(benches);
