//! Download locations for projects whose release pages do not carry the
//! binaries themselves.
//!
//! Lookups take the first matching entry, so order matters if an entry is
//! ever duplicated.

use crate::types::RegisteredAsset;

macro_rules! registered {
    ($owner:literal, $repo:literal, $os:literal, $arch:literal, $url:literal, $bin:literal) => {
        RegisteredAsset {
            owner: $owner,
            repo: $repo,
            os: $os,
            arch: $arch,
            url_template: $url,
            binary_name: $bin,
        }
    };
}

pub const REGISTERED_ASSETS: &[RegisteredAsset] = &[
    // kubectl is served from dl.k8s.io as a bare binary
    registered!("kubernetes", "kubernetes", "linux", "amd64",
        "https://dl.k8s.io/release/{{.Tag}}/bin/linux/amd64/kubectl", "kubectl"),
    registered!("kubernetes", "kubernetes", "linux", "arm64",
        "https://dl.k8s.io/release/{{.Tag}}/bin/linux/arm64/kubectl", "kubectl"),
    registered!("kubernetes", "kubernetes", "darwin", "amd64",
        "https://dl.k8s.io/release/{{.Tag}}/bin/darwin/amd64/kubectl", "kubectl"),
    registered!("kubernetes", "kubernetes", "darwin", "arm64",
        "https://dl.k8s.io/release/{{.Tag}}/bin/darwin/arm64/kubectl", "kubectl"),
    registered!("kubernetes", "kubernetes", "windows", "amd64",
        "https://dl.k8s.io/release/{{.Tag}}/bin/windows/amd64/kubectl.exe", "kubectl.exe"),
    // helm
    registered!("helm", "helm", "linux", "amd64",
        "https://get.helm.sh/helm-{{.Tag}}-linux-amd64.tar.gz", "helm"),
    registered!("helm", "helm", "linux", "arm64",
        "https://get.helm.sh/helm-{{.Tag}}-linux-arm64.tar.gz", "helm"),
    registered!("helm", "helm", "darwin", "amd64",
        "https://get.helm.sh/helm-{{.Tag}}-darwin-amd64.tar.gz", "helm"),
    registered!("helm", "helm", "darwin", "arm64",
        "https://get.helm.sh/helm-{{.Tag}}-darwin-arm64.tar.gz", "helm"),
    registered!("helm", "helm", "windows", "amd64",
        "https://get.helm.sh/helm-{{.Tag}}-windows-amd64.zip", "helm.exe"),
    // terraform
    registered!("hashicorp", "terraform", "linux", "amd64",
        "https://releases.hashicorp.com/terraform/{{.Version}}/terraform_{{.Version}}_linux_amd64.zip", "terraform"),
    registered!("hashicorp", "terraform", "linux", "arm64",
        "https://releases.hashicorp.com/terraform/{{.Version}}/terraform_{{.Version}}_linux_arm64.zip", "terraform"),
    registered!("hashicorp", "terraform", "darwin", "amd64",
        "https://releases.hashicorp.com/terraform/{{.Version}}/terraform_{{.Version}}_darwin_amd64.zip", "terraform"),
    registered!("hashicorp", "terraform", "darwin", "arm64",
        "https://releases.hashicorp.com/terraform/{{.Version}}/terraform_{{.Version}}_darwin_arm64.zip", "terraform"),
    registered!("hashicorp", "terraform", "windows", "amd64",
        "https://releases.hashicorp.com/terraform/{{.Version}}/terraform_{{.Version}}_windows_amd64.zip", "terraform.exe"),
];

pub fn find_registered(
    owner: &str,
    repo: &str,
    os: &str,
    arch: &str,
) -> Option<&'static RegisteredAsset> {
    REGISTERED_ASSETS
        .iter()
        .find(|entry| entry.matches(owner, repo, os, arch))
}
