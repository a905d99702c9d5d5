// Built-in probe catalogue
//
// One row per probe, in report order. Rows are either a shell script with a
// classifier, a parsing check, or the sysinfo-backed host snapshot.

use crate::checks::{self, CheckFn};
use crate::classifier::Classifier::{self, *};
use crate::command_probe::CommandProbe;

/// Category names, in report order
pub mod category {
    pub const SYS_INFO: &str = "sys_info";
    pub const KERNEL: &str = "kernel";
    pub const BOOT_SERVICES: &str = "boot_services";
    pub const UPDATES: &str = "updates";
    pub const NETWORK: &str = "network";
    pub const ADVANCED_NETWORK_SECURITY: &str = "advanced_network_security";
    pub const USERS_GROUPS_AUTH: &str = "users_groups_auth";
    pub const FILE_PERMISSIONS: &str = "file_permissions";
    pub const SUDO: &str = "sudo";
    pub const SERVICE_ACCOUNTS: &str = "service_accounts";
    pub const SECURITY_POLICIES: &str = "security_policies";
    pub const APP_SECURITY: &str = "app_security";
    pub const HOME_DIRECTORIES: &str = "home_directories";
    pub const STORAGE_DEVICE: &str = "storage_device";
    pub const MEM_PROCESS: &str = "mem_process";
    pub const LOGS: &str = "logs";
    pub const CONTAINERS_SECURITY: &str = "containers_security";
    pub const BACKUP: &str = "backup";
    pub const DEBIAN_TESTS: &str = "debian_tests";
    pub const MALWARE_PROTECTION: &str = "malware_protection";
}

use category::*;

pub const CATEGORIES: &[&str] = &[
    SYS_INFO,
    KERNEL,
    BOOT_SERVICES,
    UPDATES,
    NETWORK,
    ADVANCED_NETWORK_SECURITY,
    USERS_GROUPS_AUTH,
    FILE_PERMISSIONS,
    SUDO,
    SERVICE_ACCOUNTS,
    SECURITY_POLICIES,
    APP_SECURITY,
    HOME_DIRECTORIES,
    STORAGE_DEVICE,
    MEM_PROCESS,
    LOGS,
    CONTAINERS_SECURITY,
    BACKUP,
    DEBIAN_TESTS,
    MALWARE_PROTECTION,
];

/// Categories running slow security scanners
pub const SECURITY_SCAN_CATEGORIES: &[&str] = &[APP_SECURITY, MALWARE_PROTECTION];

/// Where a probe's value comes from
#[derive(Clone, Copy)]
pub enum Source {
    /// sysinfo host snapshot
    Host,
    Command(CommandProbe),
    Check(CheckFn),
}

/// One catalogue row
#[derive(Clone, Copy)]
pub struct Entry {
    pub category: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub source: Source,
}

const fn cmd(
    category: &'static str,
    name: &'static str,
    description: &'static str,
    script: &'static str,
    classifier: Classifier,
) -> Entry {
    Entry {
        category,
        name,
        description,
        source: Source::Command(CommandProbe::new(script, classifier)),
    }
}

/// Like `cmd`, but the script must exit 0
const fn checked(
    category: &'static str,
    name: &'static str,
    description: &'static str,
    script: &'static str,
    classifier: Classifier,
) -> Entry {
    Entry {
        category,
        name,
        description,
        source: Source::Command(CommandProbe::new(script, classifier).checked()),
    }
}

const fn check(
    category: &'static str,
    name: &'static str,
    description: &'static str,
    f: CheckFn,
) -> Entry {
    Entry {
        category,
        name,
        description,
        source: Source::Check(f),
    }
}

const fn presence(found: &'static str, missing: &'static str) -> Classifier {
    Presence { found, missing }
}

const FOUND: Classifier = presence("Found", "Not Found");

pub const CATALOGUE: &[Entry] = &[
    Entry {
        category: SYS_INFO,
        name: "host",
        description: "Operating system, kernel, hardware, memory and disk usage",
        source: Source::Host,
    },
    // kernel
    checked(KERNEL, "version", "Running kernel release", "uname -r", Text),
    checked(
        KERNEL,
        "aslr",
        "Address space layout randomization",
        "cat /proc/sys/kernel/randomize_va_space",
        Equals { expected: "2", yes: "Enabled", no: "Disabled" },
    ),
    cmd(
        KERNEL,
        "parameters",
        "Kernel pointer, dmesg and ptrace restrictions",
        "sysctl kernel.kptr_restrict kernel.dmesg_restrict kernel.yama.ptrace_scope",
        KeyValue(" = "),
    ),
    check(KERNEL, "modules", "Loaded kernel modules and risky ones", checks::kernel_modules),
    cmd(
        KERNEL,
        "hardening",
        "BPF, kexec and mmap_min_addr hardening",
        "sysctl kernel.unprivileged_bpf_disabled kernel.kexec_load_disabled vm.mmap_min_addr",
        KeyValue(" = "),
    ),
    cmd(KERNEL, "runlevel", "Current runlevel", "runlevel", LastWord),
    check(KERNEL, "cpu_support", "NX and PAE CPU support", checks::cpu_support),
    checked(KERNEL, "kernel_type", "Kernel name", "uname -s", Text),
    cmd(
        KERNEL,
        "io_scheduler",
        "I/O scheduler per block device",
        "for f in /sys/block/*/queue/scheduler; do [ -r \"$f\" ] && echo \"$(echo \"$f\" | cut -d/ -f4): $(cat \"$f\")\"; done",
        KeyValue(": "),
    ),
    cmd(
        KERNEL,
        "kernel_updates",
        "Pending kernel image upgrades",
        "command -v apt >/dev/null || exit 127; apt list --upgradable 2>/dev/null | grep linux-image",
        presence("Kernel updates available", "No kernel updates"),
    ),
    cmd(
        KERNEL,
        "core_dumps",
        "Core dump limits",
        "grep -E '^[^#].*[[:space:]]core[[:space:]]' /etc/security/limits.conf",
        Lines,
    ),
    cmd(
        KERNEL,
        "reboot_required",
        "Pending reboot after updates",
        "test -f /var/run/reboot-required && echo required",
        presence("Reboot is required", "No reboot required"),
    ),
    // boot and services
    checked(BOOT_SERVICES, "service_manager", "Process running as PID 1", "ps -p 1 -o comm=", TextOr("Not Found")),
    cmd(BOOT_SERVICES, "uefi_boot", "Booted through UEFI", "ls /sys/firmware/efi 2>/dev/null", FOUND),
    cmd(BOOT_SERVICES, "grub2", "GRUB2 installation", "ls /boot/grub 2>/dev/null", FOUND),
    cmd(
        BOOT_SERVICES,
        "grub_password",
        "Boot loader password protection",
        "grep -i password /etc/grub.d/40_custom 2>/dev/null",
        FOUND,
    ),
    checked(
        BOOT_SERVICES,
        "running_services",
        "Number of running services",
        "systemctl list-units --type=service --state=running --no-legend --plain",
        LineCount,
    ),
    checked(
        BOOT_SERVICES,
        "enabled_services",
        "Number of services enabled at boot",
        "systemctl list-unit-files --type=service --state=enabled --no-legend",
        LineCount,
    ),
    cmd(BOOT_SERVICES, "init_scripts", "SysV init scripts", "ls /etc/init.d 2>/dev/null", Lines),
    cmd(
        BOOT_SERVICES,
        "systemd_security",
        "systemd exposure score per service",
        "systemd-analyze security --no-pager",
        Lines,
    ),
    // updates
    cmd(
        UPDATES,
        "pending_updates",
        "Upgradable packages",
        "command -v apt >/dev/null || exit 127; apt list --upgradable 2>/dev/null | grep -v '^Listing'",
        Lines,
    ),
    cmd(
        UPDATES,
        "insecure_repositories",
        "APT sources not using https",
        "grep -rhE '^[[:space:]]*deb(-src)?[[:space:]].*http://' /etc/apt/sources.list /etc/apt/sources.list.d 2>/dev/null",
        Lines,
    ),
    check(UPDATES, "automatic_updates", "unattended-upgrades configuration", checks::automatic_updates),
    // network
    checked(
        NETWORK,
        "ipv6",
        "IPv6 enabled on all interfaces",
        "sysctl -n net.ipv6.conf.all.disable_ipv6",
        Equals { expected: "0", yes: "Enabled", no: "Disabled" },
    ),
    cmd(
        NETWORK,
        "dns_servers",
        "Configured name servers",
        "grep -i '^nameserver' /etc/resolv.conf | awk '{print $2}'",
        Lines,
    ),
    cmd(
        NETWORK,
        "dnssec",
        "systemd-resolved status",
        "systemctl is-active systemd-resolved",
        Equals { expected: "active", yes: "Enabled", no: "Unknown" },
    ),
    cmd(
        NETWORK,
        "default_gateway",
        "Default route present",
        "ip route show default",
        presence("OK", "Not Found"),
    ),
    checked(NETWORK, "listening_ports", "TCP/UDP listening sockets", "ss -tuln", Lines),
    cmd(
        NETWORK,
        "promiscuous_interfaces",
        "Interfaces in promiscuous mode",
        "ip link show | grep -i promisc",
        FOUND,
    ),
    cmd(
        NETWORK,
        "half_open_connections",
        "Connections stuck in SYN-RECV",
        "ss -tan state syn-recv | tail -n +2",
        FOUND,
    ),
    cmd(
        NETWORK,
        "dhcp_client",
        "DHCP client process",
        "pgrep -x 'dhclient|dhcpcd|dhcpcd5'",
        presence("Running", "Not Running"),
    ),
    cmd(NETWORK, "arp_monitoring", "arpwatch process", "pgrep -x arpwatch", FOUND),
    cmd(
        NETWORK,
        "ipv6_listeners",
        "Sockets listening on IPv6",
        "ss -tuln -6 | tail -n +2",
        FOUND,
    ),
    // advanced network security
    checked(
        ADVANCED_NETWORK_SECURITY,
        "iptables",
        "iptables rules accepting traffic",
        "iptables -L -n",
        Contains {
            needle: "ACCEPT",
            yes: "Rules allowing traffic found, review needed",
            no: "No suspicious rules found",
        },
    ),
    checked(
        ADVANCED_NETWORK_SECURITY,
        "ufw",
        "Uncomplicated firewall status",
        "ufw status verbose",
        Contains { needle: "Status: active", yes: "Active", no: "Inactive" },
    ),
    cmd(
        ADVANCED_NETWORK_SECURITY,
        "vpn",
        "Tunnel interfaces",
        "ip -o link show | grep -E ' (tun|wg)[0-9]*:'",
        presence("Active VPN interface found", "No active VPN interfaces found"),
    ),
    cmd(
        ADVANCED_NETWORK_SECURITY,
        "ipsec",
        "IPsec security associations",
        "ip xfrm state",
        presence("Active IPsec configurations found", "No IPsec configurations found"),
    ),
    // users, groups, authentication
    cmd(
        USERS_GROUPS_AUTH,
        "admin_groups",
        "Administrative groups and members",
        "getent group sudo wheel admin",
        Lines,
    ),
    checked(
        USERS_GROUPS_AUTH,
        "unique_uids",
        "Duplicate UIDs in /etc/passwd",
        "cut -d: -f3 /etc/passwd | sort | uniq -d",
        presence("Not Unique", "OK"),
    ),
    cmd(
        USERS_GROUPS_AUTH,
        "group_file_consistency",
        "grpck read-only verification",
        "grpck -r",
        ExitStatus { ok: "OK", failed: "Not Consistent" },
    ),
    cmd(
        USERS_GROUPS_AUTH,
        "passwd_file_consistency",
        "pwck read-only verification",
        "pwck -r",
        ExitStatus { ok: "OK", failed: "Not Consistent" },
    ),
    check(USERS_GROUPS_AUTH, "password_hashing", "Password hashing schemes in use", checks::password_hashing),
    cmd(
        USERS_GROUPS_AUTH,
        "password_hashing_rounds",
        "SHA_CRYPT rounds configured",
        "grep -E '^[[:space:]]*SHA_CRYPT_(MIN|MAX)_ROUNDS' /etc/login.defs",
        FOUND,
    ),
    checked(
        USERS_GROUPS_AUTH,
        "system_users",
        "Accounts with UID below 1000",
        "awk -F: '$3 < 1000 {print $1}' /etc/passwd",
        Lines,
    ),
    cmd(
        USERS_GROUPS_AUTH,
        "nis",
        "NIS in the name service switch",
        "grep -E '^[^#].*[[:space:]]nis([[:space:]]|$)' /etc/nsswitch.conf",
        presence("Enabled", "Not Enabled"),
    ),
    cmd(USERS_GROUPS_AUTH, "pam_configuration", "PAM service files", "ls /etc/pam.d 2>/dev/null", Lines),
    cmd(
        USERS_GROUPS_AUTH,
        "locked_accounts",
        "Accounts with a locked password",
        "passwd -Sa 2>/dev/null | awk '$2 == \"L\" {print $1}'",
        Lines,
    ),
    cmd(
        USERS_GROUPS_AUTH,
        "root_password_aging",
        "Password aging of the root account",
        "chage -l root",
        KeyValue(":"),
    ),
    cmd(
        USERS_GROUPS_AUTH,
        "single_user_mode",
        "Single-user mode authentication",
        "grep -s single /etc/inittab",
        FOUND,
    ),
    // file permissions
    cmd(
        FILE_PERMISSIONS,
        "critical_files",
        "Mode of sensitive system files",
        "stat -c '%n: %A' /boot/grub/grub.cfg /etc/crontab /etc/group /etc/passwd /etc/shadow /etc/gshadow /etc/ssh/sshd_config 2>/dev/null",
        KeyValue(": "),
    ),
    cmd(
        FILE_PERMISSIONS,
        "critical_directories",
        "Mode of sensitive directories",
        "stat -c '%n: %A' /root/.ssh /etc/cron.d /etc/cron.daily /etc/cron.hourly /etc/cron.weekly /etc/cron.monthly 2>/dev/null",
        KeyValue(": "),
    ),
    cmd(
        FILE_PERMISSIONS,
        "world_writable",
        "World-writable files under system paths",
        "find /etc /usr/bin /usr/sbin -xdev -type f -perm -0002 2>/dev/null | head -n 50",
        Lines,
    ),
    // sudo
    cmd(
        SUDO,
        "sudo_users",
        "Members of the sudo group",
        "getent group sudo | cut -d: -f4 | tr ',' '\\n'",
        Lines,
    ),
    checked(
        SUDO,
        "sudoers_mode",
        "Mode of /etc/sudoers",
        "stat -c '%a' /etc/sudoers",
        Equals { expected: "440", yes: "OK (0440)", no: "Review permissions" },
    ),
    cmd(
        SUDO,
        "sudoers_syntax",
        "visudo syntax check",
        "visudo -c",
        ExitStatus { ok: "Valid", failed: "Invalid" },
    ),
    cmd(
        SUDO,
        "sudoers_includes",
        "Include directives in /etc/sudoers",
        "grep -iE '^[[:space:]]*[@#]include' /etc/sudoers",
        Lines,
    ),
    cmd(
        SUDO,
        "nopasswd_rules",
        "Rules granting sudo without a password",
        "grep -rhE '^[^#].*NOPASSWD' /etc/sudoers /etc/sudoers.d 2>/dev/null",
        Lines,
    ),
    // service accounts
    checked(
        SERVICE_ACCOUNTS,
        "elevated_privileges",
        "Privileged groups and their members",
        "grep -E '^(sudo|root|wheel):' /etc/group",
        Lines,
    ),
    check(SERVICE_ACCOUNTS, "empty_passwords", "Accounts with an empty password", checks::empty_passwords),
    checked(
        SERVICE_ACCOUNTS,
        "login_shells",
        "System accounts with an interactive shell",
        "awk -F: '$3 < 1000 && $7 !~ /(nologin|false)$/ {print $1 \": \" $7}' /etc/passwd",
        KeyValue(": "),
    ),
    cmd(
        SERVICE_ACCOUNTS,
        "inactive_accounts",
        "Accounts without a login in 90 days",
        "lastlog -b 90 | tail -n +2 | awk '{print $1}'",
        Lines,
    ),
    // security policies
    check(SECURITY_POLICIES, "password_policy", "Password aging and length policy", checks::password_policy),
    cmd(
        SECURITY_POLICIES,
        "audit_logs",
        "auditd log file settings",
        "grep -E '^[[:space:]]*(log_file|max_log_file|max_log_file_action|num_logs)[[:space:]]*=' /etc/audit/auditd.conf",
        KeyValue("="),
    ),
    cmd(SECURITY_POLICIES, "selinux", "SELinux mode", "getenforce", TextOr("Not Found")),
    cmd(
        SECURITY_POLICIES,
        "apparmor",
        "AppArmor status",
        "aa-enabled",
        ExitStatus { ok: "Enabled", failed: "Disabled" },
    ),
    cmd(
        SECURITY_POLICIES,
        "ssh_root_login",
        "PermitRootLogin in sshd_config",
        "grep -iE '^[[:space:]]*PermitRootLogin' /etc/ssh/sshd_config",
        TextOr("Not Set"),
    ),
    // application security
    check(APP_SECURITY, "apache_ssl", "Apache SSL module and HTTPS listener", checks::apache_ssl),
    cmd(
        APP_SECURITY,
        "nginx_ssl",
        "SSL directives in nginx configuration",
        "grep -rs ssl /etc/nginx/nginx.conf /etc/nginx/sites-enabled",
        presence("Nginx SSL/TLS is enabled", "Nginx SSL/TLS is not enabled"),
    ),
    checked(
        APP_SECURITY,
        "mysql_ssl",
        "MySQL SSL support",
        "mysql -N -e \"SHOW VARIABLES LIKE 'have_ssl';\"",
        KeyValue("\t"),
    ),
    checked(APP_SECURITY, "postgresql_ssl", "PostgreSQL ssl setting", "psql -tAc 'SHOW ssl;'", Text),
    cmd(
        APP_SECURITY,
        "ssl_certificates",
        "Number of trusted CA certificates",
        "ls /etc/ssl/certs 2>/dev/null | wc -l",
        Text,
    ),
    // home directories
    cmd(
        HOME_DIRECTORIES,
        "permissions",
        "Mode of home directories",
        "stat -c '%n: %A' /home/* 2>/dev/null",
        KeyValue(": "),
    ),
    cmd(
        HOME_DIRECTORIES,
        "ownership",
        "Owner of home directories",
        "stat -c '%n: %U' /home/* 2>/dev/null",
        KeyValue(": "),
    ),
    cmd(
        HOME_DIRECTORIES,
        "shell_history",
        "Mode of shell history files",
        "stat -c '%n: %A' /root/.bash_history /home/*/.bash_history /home/*/.zsh_history 2>/dev/null",
        KeyValue(": "),
    ),
    // storage
    checked(
        STORAGE_DEVICE,
        "encrypted_volumes",
        "LUKS encrypted block devices",
        "lsblk -rno NAME,FSTYPE | awk '$2 == \"crypto_LUKS\" {print $1}'",
        Lines,
    ),
    check(STORAGE_DEVICE, "mount_options", "nodev/nosuid/noexec on temporary mounts", checks::mount_options),
    cmd(
        STORAGE_DEVICE,
        "disk_health",
        "SMART overall health of /dev/sda",
        "smartctl -H /dev/sda",
        Contains {
            needle: "PASSED",
            yes: "Disk health is good",
            no: "Disk health check failed or disk needs attention",
        },
    ),
    checked(
        STORAGE_DEVICE,
        "filesystem_usage",
        "Disk usage per filesystem",
        "df -hP -x tmpfs -x devtmpfs",
        Lines,
    ),
    // memory and processes
    checked(
        MEM_PROCESS,
        "meminfo",
        "Memory and swap totals",
        "grep -E '^(MemTotal|MemAvailable|SwapTotal|SwapFree):' /proc/meminfo",
        KeyValue(":"),
    ),
    checked(
        MEM_PROCESS,
        "zombie_processes",
        "Processes in zombie state",
        "ps -eo pid=,stat=,comm= | awk '$2 ~ /^Z/'",
        Lines,
    ),
    checked(
        MEM_PROCESS,
        "io_wait_processes",
        "Processes in uninterruptible sleep",
        "ps -eo pid=,stat=,comm= | awk '$2 ~ /^D/'",
        Lines,
    ),
    cmd(MEM_PROCESS, "prelink", "prelink tooling installed", "command -v prelink", FOUND),
    checked(
        MEM_PROCESS,
        "top_memory",
        "Processes using the most memory",
        "ps aux --sort=-%mem | head -n 11",
        Lines,
    ),
    // logs
    cmd(
        LOGS,
        "log_files",
        "Presence of the main system logs",
        "for f in /var/log/auth.log /var/log/syslog /var/log/messages /var/log/dmesg; do if [ -s \"$f\" ]; then echo \"$f: OK\"; elif [ -e \"$f\" ]; then echo \"$f: EMPTY\"; else echo \"$f: NOT FOUND\"; fi; done",
        KeyValue(": "),
    ),
    cmd(
        LOGS,
        "log_rotation",
        "logrotate configuration",
        "test -f /etc/logrotate.conf && echo /etc/logrotate.conf",
        FOUND,
    ),
    cmd(
        LOGS,
        "old_logs",
        "Logs not modified for 30 days",
        "find /var/log -maxdepth 1 -type f -mtime +30 2>/dev/null",
        Lines,
    ),
    cmd(
        LOGS,
        "journald_storage",
        "journald Storage= setting",
        "grep -E '^[[:space:]]*Storage=' /etc/systemd/journald.conf",
        TextOr("Not Set"),
    ),
    // containers
    checked(
        CONTAINERS_SECURITY,
        "docker_containers",
        "Running Docker containers and published ports",
        "docker ps --format '{{.Names}}: {{.Image}} {{.Ports}}'",
        KeyValue(": "),
    ),
    checked(
        CONTAINERS_SECURITY,
        "docker_memory_limits",
        "Memory limit per running container",
        "command -v docker >/dev/null || exit 127; docker ps -q | xargs -r docker inspect --format '{{.Name}}: {{.HostConfig.Memory}}'",
        KeyValue(": "),
    ),
    checked(
        CONTAINERS_SECURITY,
        "privileged_containers",
        "Containers running privileged",
        "command -v docker >/dev/null || exit 127; docker ps -q | xargs -r docker inspect --format '{{.Name}}: {{.HostConfig.Privileged}}'",
        KeyValue(": "),
    ),
    check(
        CONTAINERS_SECURITY,
        "docker_image_sources",
        "Images outside the official library",
        checks::docker_image_sources,
    ),
    checked(CONTAINERS_SECURITY, "lxc_containers", "LXC containers", "lxc list --format csv -c n", Lines),
    // backup
    cmd(
        BACKUP,
        "schedule",
        "Backup jobs in root's crontab",
        "crontab -l 2>/dev/null | grep -i backup",
        Lines,
    ),
    cmd(BACKUP, "storage", "Backup directory", "ls -ld /backup 2>/dev/null", TextOr("Not Found")),
    cmd(
        BACKUP,
        "encryption",
        "GPG-encrypted backups",
        "ls /backup 2>/dev/null | grep -E '\\.gpg$'",
        Lines,
    ),
    cmd(
        BACKUP,
        "restore_script",
        "Executable restore script",
        "test -x /usr/local/bin/restore_backup.sh && echo /usr/local/bin/restore_backup.sh",
        FOUND,
    ),
    // debian tests
    cmd(
        DEBIAN_TESTS,
        "system_binaries",
        "System binary directories present and non-empty",
        "for d in /bin /sbin /usr/bin /usr/sbin /usr/local/bin; do \
         if [ -n \"$(ls \"$d\" 2>/dev/null)\" ]; then echo \"$d: FOUND\"; else echo \"$d: NOT FOUND\"; fi; done",
        KeyValue(": "),
    ),
    cmd(
        DEBIAN_TESTS,
        "pam_status",
        "PAM configuration directory",
        "ls /etc/pam.d 2>/dev/null",
        presence("FOUND", "NOT FOUND"),
    ),
    cmd(
        DEBIAN_TESTS,
        "debian_test_results",
        "Debian test suite run (DEB-0001)",
        "command -v debian-tests >/dev/null || exit 127; debian-tests 2>&1",
        Contains {
            needle: "DEB-0001",
            yes: "Test executed successfully",
            no: "Test did not execute as expected",
        },
    ),
    cmd(
        DEBIAN_TESTS,
        "required_packages",
        "Debian hardening packages",
        "command -v dpkg >/dev/null || exit 127; \
         for p in libpam-tmpdir apt-listbugs apt-listchanges needrestart fail2ban; do \
         if dpkg -l 2>/dev/null | grep -q \"$p\"; then echo \"$p: Installed\"; else echo \"$p: Not Installed\"; fi; done",
        KeyValue(": "),
    ),
    cmd(
        DEBIAN_TESTS,
        "filesystem_checks",
        "Disk encryption tools",
        "for t in DM-Crypt:dmcrypt Cryptsetup:cryptsetup Cryptmount:cryptmount; do \
         if command -v \"${t#*:}\" >/dev/null 2>&1; then echo \"${t%%:*}: Found\"; else echo \"${t%%:*}: Not Found\"; fi; done",
        KeyValue(": "),
    ),
    // malware protection
    cmd(
        MALWARE_PROTECTION,
        "lynis",
        "Lynis quick system audit warnings",
        "command -v lynis >/dev/null || exit 127; lynis audit system --quick --no-colors 2>/dev/null | grep -E 'Warning|Suggestion'",
        Lines,
    ),
    cmd(
        MALWARE_PROTECTION,
        "chkrootkit",
        "chkrootkit infected findings",
        "chkrootkit -q",
        Lines,
    ),
    cmd(
        MALWARE_PROTECTION,
        "rkhunter",
        "rkhunter warnings",
        "rkhunter --check --skip-keypress --report-warnings-only",
        Lines,
    ),
    cmd(
        MALWARE_PROTECTION,
        "clamav",
        "ClamAV scanner installed",
        "command -v clamscan",
        presence("Installed", "Not Installed"),
    ),
    cmd(
        MALWARE_PROTECTION,
        "package_integrity",
        "debsums changed files",
        "debsums -s 2>&1",
        Lines,
    ),
];
